//! Python source adapter and syntax tree serializer for astviz.
//!
//! The crate covers the first two stages of the visualization pipeline:
//!
//! 1. [`parse`] turns a [`SourceInput`] into a [`SyntaxNode`] tree using the
//!    `tree-sitter-python` grammar, after enforcing the input size ceiling.
//! 2. [`serialize::to_record`] turns that tree into the generic intermediate
//!    [`Value`] form consumed by the graph builder.
//!
//! # Example
//!
//! ```
//! use astviz_parser::{SourceInput, ValueExt, parse, serialize, value::TYPE_KEY};
//!
//! let tree = parse(&SourceInput::text("x = 1")).expect("valid Python");
//! let record = serialize::to_record(&tree).expect("serializable tree");
//!
//! assert_eq!(record.type_tag(), Some("Module"));
//! assert_eq!(record.as_object().and_then(|r| r.keys().next()).map(String::as_str), Some(TYPE_KEY));
//! ```

pub mod error;
pub mod serialize;
pub mod source;
pub mod syntax;
pub mod value;

mod lower;

pub use error::ParseError;
pub use source::{MAX_INPUT_CHARS, SourceInput};
pub use syntax::{Field, Primitive, SyntaxNode};
pub use value::{Record, Value, ValueExt};

use log::{debug, trace};
use tree_sitter::{Node, Parser};

use lower::Lowerer;

/// Deepest concrete-tree nesting accepted by [`parse`].
///
/// Lowering and serialization recurse once per level, so the tree is
/// measured before either runs.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Parses Python source into a syntax tree.
///
/// Untrusted input is checked against [`MAX_INPUT_CHARS`] before any parser
/// is created, so oversized input never pays the parsing cost.
///
/// # Errors
///
/// - [`ParseError::InputTooLarge`] if untrusted text exceeds the ceiling.
/// - [`ParseError::Syntax`] if the text is not valid Python; the position is
///   that of the first offending node.
/// - [`ParseError::NestingTooDeep`] if the tree nests deeper than
///   [`MAX_NESTING_DEPTH`].
/// - [`ParseError::Language`] if the grammar cannot be loaded.
pub fn parse(input: &SourceInput) -> Result<SyntaxNode, ParseError> {
    let source = input.checked()?;
    debug!(bytes = source.len(), trusted = input.is_trusted(); "Parsing Python source");

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::language())
        .map_err(|err| ParseError::Language(err.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::Language("parser produced no tree".to_string()))?;

    let root = tree.root_node();
    if let Some(node) = node_beyond_depth(root, MAX_NESTING_DEPTH) {
        let position = node.start_position();
        return Err(ParseError::NestingTooDeep {
            line: position.row + 1,
            column: position.column + 1,
            limit: MAX_NESTING_DEPTH,
        });
    }

    if let Some(node) = first_error(root) {
        let position = node.start_position();
        let message = if node.is_missing() {
            format!("invalid syntax: missing `{}`", node.kind())
        } else {
            "invalid syntax".to_string()
        };
        return Err(ParseError::Syntax {
            line: position.row + 1,
            column: position.column + 1,
            message,
        });
    }

    let syntax = Lowerer::new(source).lower(root);
    trace!(nodes = syntax.count_nodes(); "Lowered syntax tree");

    Ok(syntax)
}

/// Returns the first `ERROR` or `MISSING` node in document order.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Returns the first node nested more than `limit` levels below `root`,
/// counting `root` as level 1.
fn node_beyond_depth(root: Node<'_>, limit: usize) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    let mut depth = 1;
    loop {
        if depth > limit {
            return Some(cursor.node());
        }
        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
            depth -= 1;
        }
    }
}
