//! Node label sanitization.
//!
//! Every label passes through [`sanitize_label`] before it is attached to a
//! [`GraphNode`](crate::graph::GraphNode):
//!
//! - A trailing `,` or `/` is replaced by `*`.
//! - Labels longer than [`MAX_LABEL_CHARS`] characters are cut to
//!   [`TRUNCATED_LABEL_CHARS`] characters followed by [`ELLIPSIS`].
//!
//! Lengths are counted in characters, never bytes, so multi-byte text is
//! never split in the middle of a code point.

/// Longest label, in characters, that is kept unchanged.
pub const MAX_LABEL_CHARS: usize = 250;

/// Characters kept from an over-long label before the ellipsis is appended.
pub const TRUNCATED_LABEL_CHARS: usize = MAX_LABEL_CHARS - ELLIPSIS.len();

/// Marker appended to truncated labels.
pub const ELLIPSIS: &str = "...";

/// Replacement for a trailing separator character.
const SEPARATOR_REPLACEMENT: char = '*';

/// Sanitizes a prospective node label.
///
/// `None` is treated as empty text. The function is pure and idempotent:
/// sanitizing an already sanitized label returns it unchanged.
///
/// # Examples
///
/// ```
/// use astviz_core::label::sanitize_label;
///
/// assert_eq!(sanitize_label(Some("a,b,")), "a,b*");
/// assert_eq!(sanitize_label(None), "");
/// ```
pub fn sanitize_label(label: Option<&str>) -> String {
    let label = label.unwrap_or_default();

    let mut sanitized = match label.strip_suffix([',', '/']) {
        Some(head) => {
            let mut replaced = String::with_capacity(label.len());
            replaced.push_str(head);
            replaced.push(SEPARATOR_REPLACEMENT);
            replaced
        }
        None => label.to_string(),
    };

    if sanitized.chars().count() > MAX_LABEL_CHARS {
        sanitized = sanitized
            .chars()
            .take(TRUNCATED_LABEL_CHARS)
            .chain(ELLIPSIS.chars())
            .collect();
    }

    sanitized
}
