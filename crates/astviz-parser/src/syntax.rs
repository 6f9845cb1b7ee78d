//! Native syntax tree model.
//!
//! A [`SyntaxNode`] carries a type tag and an ordered list of named
//! [`Field`]s. Each field is one of four explicit shapes, so every consumer
//! handles the tree with an exhaustive `match` instead of probing types at
//! runtime.

/// A primitive field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Raw content of a byte-string literal. Decoded as UTF-8 on
    /// serialization.
    Bytes(Vec<u8>),
}

/// The value held by a named field of a [`SyntaxNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A single nested node.
    Node(Box<SyntaxNode>),
    /// An ordered sequence of nodes.
    Sequence(Vec<SyntaxNode>),
    /// A primitive value.
    Primitive(Primitive),
    /// The field exists but holds nothing.
    Absent,
}

/// A node of the parsed syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    kind: String,
    fields: Vec<(String, Field)>,
}

impl SyntaxNode {
    /// Creates a node with the given type tag and no fields.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field, keeping insertion order.
    pub fn with_field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    /// Returns the type tag, e.g. `Assignment`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Iterates over the fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields
            .iter()
            .map(|(name, field)| (name.as_str(), field))
    }

    /// Returns the first field with the given name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, field)| field)
    }

    /// Returns the node held by a [`Field::Node`] field.
    pub fn child(&self, name: &str) -> Option<&SyntaxNode> {
        match self.field(name)? {
            Field::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Counts this node and every node nested below it.
    pub fn count_nodes(&self) -> usize {
        1 + self
            .fields
            .iter()
            .map(|(_, field)| match field {
                Field::Node(node) => node.count_nodes(),
                Field::Sequence(nodes) => nodes.iter().map(SyntaxNode::count_nodes).sum(),
                Field::Primitive(_) | Field::Absent => 0,
            })
            .sum::<usize>()
    }
}
