//! Syntax tree serializer.
//!
//! A [`SyntaxNode`] serializes to a JSON object whose first entry is
//! [`TYPE_KEY`] holding the type tag, followed by one entry per field in
//! field order. Sequences become arrays, [`Field::Absent`] becomes `null`,
//! byte strings are decoded as UTF-8, and other primitives pass through.
//!
//! [`to_record`] performs the full transport round trip: the tree is encoded
//! to JSON text and the text is decoded back into a [`Value`].

use log::trace;
use serde::{
    Serialize, Serializer,
    ser::{Error as _, SerializeMap},
};
use thiserror::Error;

use crate::{
    syntax::{Field, Primitive, SyntaxNode},
    value::{TYPE_KEY, Value},
};

/// Error raised while encoding or decoding the intermediate form.
#[derive(Debug, Error)]
#[error("failed to serialize syntax tree: {0}")]
pub struct SerializeError(#[from] serde_json::Error);

/// Encodes a syntax tree as JSON text.
///
/// # Errors
///
/// Returns [`SerializeError`] if a byte-string literal is not valid UTF-8.
pub fn to_json(node: &SyntaxNode) -> Result<String, SerializeError> {
    Ok(serde_json::to_string(node)?)
}

/// Converts a syntax tree into its intermediate [`Value`] form.
///
/// # Errors
///
/// Returns [`SerializeError`] if encoding fails or the encoded tree nests
/// deeper than the JSON decoder accepts.
pub fn to_record(node: &SyntaxNode) -> Result<Value, SerializeError> {
    let json = to_json(node)?;
    trace!(bytes = json.len(); "Encoded syntax tree");
    Ok(serde_json::from_str(&json)?)
}

impl Serialize for SyntaxNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields: Vec<(&str, &Field)> = self.fields().collect();
        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
        map.serialize_entry(TYPE_KEY, self.kind())?;
        for (name, field) in fields {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Node(node) => node.serialize(serializer),
            Self::Sequence(nodes) => serializer.collect_seq(nodes),
            Self::Primitive(primitive) => primitive.serialize(serializer),
            Self::Absent => serializer.serialize_unit(),
        }
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::Str(text) => serializer.serialize_str(text),
            Self::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => serializer.serialize_str(text),
                Err(err) => Err(S::Error::custom(format!(
                    "byte string is not valid UTF-8: {err}"
                ))),
            },
        }
    }
}
