//! Lowering of the tree-sitter concrete tree into [`SyntaxNode`]s.
//!
//! tree-sitter keeps every token of the source. The lowering drops
//! punctuation, keeps operator tokens that sit in a named field as text,
//! turns leaf values (names, numbers, strings, constants) into primitive
//! fields, and names the attribute-like fields (`name`, `attr`, `module`,
//! `arg`) as plain strings so they read naturally in node labels.

use tree_sitter::Node;

use crate::syntax::{Field, Primitive, SyntaxNode};

/// Field holding named children that are not attached to any grammar field.
pub(crate) const CHILDREN_FIELD: &str = "children";

/// Grammar fields renamed during lowering, as `(node kind, field, alias)`.
const FIELD_ALIASES: &[(&str, &str, &str)] = &[
    ("attribute", "attribute", "attr"),
    ("import_from_statement", "module_name", "module"),
    ("keyword_argument", "name", "arg"),
    ("default_parameter", "name", "arg"),
    ("typed_default_parameter", "name", "arg"),
];

/// Fields collapsed to their source text when they hold a single name.
const COLLAPSIBLE_FIELDS: &[&str] = &["name", "attr", "module", "arg"];

/// Node kinds whose text is a plain (possibly dotted) name.
const NAME_KINDS: &[&str] = &["identifier", "dotted_name"];

/// Statement kinds that replace a wrapping `expression_statement`.
const STATEMENT_LIKE: &[&str] = &["assignment", "augmented_assignment"];

/// Grouping key for children while a node is being lowered.
#[derive(Debug, PartialEq, Eq)]
enum Slot {
    Named(&'static str),
    Children,
}

/// Lowers a tree-sitter node and everything below it.
pub(crate) struct Lowerer<'s> {
    source: &'s str,
}

impl<'s> Lowerer<'s> {
    pub(crate) fn new(source: &'s str) -> Self {
        Self { source }
    }

    pub(crate) fn lower(&self, node: Node<'_>) -> SyntaxNode {
        let tag = type_tag(node.kind());
        match node.kind() {
            "identifier" => SyntaxNode::new(tag).with_field(
                "id",
                Field::Primitive(Primitive::Str(self.text(node).to_string())),
            ),
            "integer" => SyntaxNode::new(tag)
                .with_field("n", Field::Primitive(integer_value(self.text(node)))),
            "float" => {
                SyntaxNode::new(tag).with_field("n", Field::Primitive(float_value(self.text(node))))
            }
            "true" => SyntaxNode::new(tag).with_field("value", Field::Primitive(Primitive::Bool(true))),
            "false" => {
                SyntaxNode::new(tag).with_field("value", Field::Primitive(Primitive::Bool(false)))
            }
            "none" => SyntaxNode::new(tag).with_field("value", Field::Absent),
            "string" => self.string(node, tag),
            "expression_statement" => match single_statement_like(node) {
                Some(inner) => self.lower(inner),
                None => self.composite(node, tag),
            },
            _ => self.composite(node, tag),
        }
    }

    fn composite(&self, node: Node<'_>, tag: String) -> SyntaxNode {
        let kind = node.kind();
        let mut slots: Vec<(Slot, Vec<Node<'_>>)> = Vec::new();

        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                let slot = match cursor.field_name() {
                    Some(field) => Some(Slot::Named(field_alias(kind, field))),
                    None if child.is_named() => Some(Slot::Children),
                    None => None,
                };

                if let Some(slot) = slot {
                    if !child.is_extra() {
                        match slots.iter_mut().find(|(existing, _)| *existing == slot) {
                            Some((_, nodes)) => nodes.push(child),
                            None => slots.push((slot, vec![child])),
                        }
                    }
                }

                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        slots
            .into_iter()
            .fold(SyntaxNode::new(tag), |syntax, (slot, nodes)| match slot {
                Slot::Named(name) => {
                    let field = self.named_field(name, &nodes);
                    syntax.with_field(name, field)
                }
                Slot::Children => syntax.with_field(
                    CHILDREN_FIELD,
                    Field::Sequence(nodes.into_iter().map(|child| self.lower(child)).collect()),
                ),
            })
    }

    fn named_field(&self, name: &str, nodes: &[Node<'_>]) -> Field {
        match nodes {
            [] => Field::Absent,
            [only] if !only.is_named() => {
                Field::Primitive(Primitive::Str(self.text(*only).to_string()))
            }
            [only] if COLLAPSIBLE_FIELDS.contains(&name) && NAME_KINDS.contains(&only.kind()) => {
                Field::Primitive(Primitive::Str(self.text(*only).to_string()))
            }
            [only] => Field::Node(Box::new(self.lower(*only))),
            many if many.iter().all(|node| !node.is_named()) => {
                // Multi-token operators such as `not in` spread over several tokens.
                let tokens: Vec<&str> = many.iter().map(|node| self.text(*node)).collect();
                Field::Primitive(Primitive::Str(tokens.join(" ")))
            }
            many => Field::Sequence(
                many.iter()
                    .filter(|node| node.is_named())
                    .map(|node| self.lower(*node))
                    .collect(),
            ),
        }
    }

    fn string(&self, node: Node<'_>, tag: String) -> SyntaxNode {
        let mut start = None;
        let mut end = None;
        let mut interpolations = Vec::new();

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "string_start" => start = Some(child),
                "string_end" => end = Some(child),
                "interpolation" => interpolations.push(child),
                _ => {}
            }
        }

        let (prefix, content) = match (start, end) {
            (Some(start), Some(end)) => (
                self.text(start),
                self.source
                    .get(start.end_byte()..end.start_byte())
                    .unwrap_or_default(),
            ),
            _ => ("", self.text(node)),
        };

        let value = if prefix.contains(['b', 'B']) {
            Primitive::Bytes(content.as_bytes().to_vec())
        } else {
            Primitive::Str(content.to_string())
        };

        let syntax = SyntaxNode::new(tag).with_field("s", Field::Primitive(value));
        if interpolations.is_empty() {
            syntax
        } else {
            syntax.with_field(
                "values",
                Field::Sequence(
                    interpolations
                        .into_iter()
                        .map(|child| self.lower(child))
                        .collect(),
                ),
            )
        }
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }
}

/// Converts a tree-sitter kind (`expression_statement`) to a type tag
/// (`ExpressionStatement`).
pub(crate) fn type_tag(kind: &str) -> String {
    kind.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn field_alias(kind: &str, field: &'static str) -> &'static str {
    FIELD_ALIASES
        .iter()
        .find(|(alias_kind, alias_field, _)| *alias_kind == kind && *alias_field == field)
        .map(|(_, _, alias)| *alias)
        .unwrap_or(field)
}

fn single_statement_like(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let mut named = node
        .named_children(&mut cursor)
        .filter(|child| !child.is_extra());

    match (named.next(), named.next()) {
        (Some(only), None) if STATEMENT_LIKE.contains(&only.kind()) => Some(only),
        _ => None,
    }
}

fn integer_value(text: &str) -> Primitive {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(octal) = lower.strip_prefix("0o") {
        i64::from_str_radix(octal, 8).ok()
    } else if let Some(binary) = lower.strip_prefix("0b") {
        i64::from_str_radix(binary, 2).ok()
    } else {
        lower.parse::<i64>().ok()
    };

    match parsed {
        Some(value) => Primitive::Int(value),
        None => Primitive::Str(text.to_string()),
    }
}

fn float_value(text: &str) -> Primitive {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => Primitive::Float(value),
        _ => Primitive::Str(text.to_string()),
    }
}
