//! Intermediate record form of a syntax tree.
//!
//! The serializer produces, and the graph builder consumes, plain
//! [`serde_json::Value`]s. Objects keep insertion order (`preserve_order`),
//! so every record produced from a syntax node starts with [`TYPE_KEY`].
//! [`ValueExt`] adds the few queries the pipeline needs on top.

pub use serde_json::Value;

/// Reserved record key holding the node type tag.
pub const TYPE_KEY: &str = "_type";

/// Insertion-ordered record of named values.
pub type Record = serde_json::Map<String, Value>;

/// Pipeline-specific queries on intermediate values.
pub trait ValueExt {
    /// Returns the type tag of a record value.
    fn type_tag(&self) -> Option<&str>;

    /// Counts the type-tag entries in this value and everything below it.
    fn count_type_tags(&self) -> usize;

    /// Text of the value as it appears in a node label.
    ///
    /// Strings print verbatim; everything else prints as compact JSON.
    fn label_text(&self) -> String;
}

impl ValueExt for Value {
    fn type_tag(&self) -> Option<&str> {
        self.as_object()?.get(TYPE_KEY)?.as_str()
    }

    fn count_type_tags(&self) -> usize {
        match self {
            Self::Object(record) => record
                .iter()
                .map(|(key, value)| usize::from(key == TYPE_KEY) + value.count_type_tags())
                .sum(),
            Self::Array(items) => items.iter().map(Value::count_type_tags).sum(),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => 0,
        }
    }

    fn label_text(&self) -> String {
        match self {
            Self::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}
