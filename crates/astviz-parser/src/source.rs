//! Source text accepted by the parser.

use std::borrow::Cow;

use crate::error::ParseError;

/// Maximum length, in characters, of untrusted source text.
pub const MAX_INPUT_CHARS: usize = 1000;

/// Source text handed to [`parse`](crate::parse).
///
/// [`SourceInput::Text`] comes from outside the process and is rejected when
/// longer than [`MAX_INPUT_CHARS`]. [`SourceInput::Trusted`] is produced by the
/// program itself, typically embedded with `include_str!`, and skips the
/// length check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    /// Untrusted text, subject to the length ceiling.
    Text(String),
    /// In-process source, not length-checked.
    Trusted(Cow<'static, str>),
}

impl SourceInput {
    /// Wraps untrusted text.
    pub fn text(source: impl Into<String>) -> Self {
        Self::Text(source.into())
    }

    /// Wraps source produced by the program itself.
    pub fn trusted(source: impl Into<Cow<'static, str>>) -> Self {
        Self::Trusted(source.into())
    }

    /// Returns the source text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text.as_str(),
            Self::Trusted(text) => &**text,
        }
    }

    /// Returns `true` for [`SourceInput::Trusted`].
    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::Trusted(_))
    }

    /// Returns the text once it has passed the size ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InputTooLarge`] for untrusted text longer than
    /// [`MAX_INPUT_CHARS`] characters.
    pub(crate) fn checked(&self) -> Result<&str, ParseError> {
        match self {
            Self::Trusted(text) => Ok(&**text),
            // A byte length within the limit implies a character count within it.
            Self::Text(text) if text.len() <= MAX_INPUT_CHARS => Ok(text.as_str()),
            Self::Text(text) => {
                let length = text.chars().count();
                if length > MAX_INPUT_CHARS {
                    Err(ParseError::InputTooLarge {
                        length,
                        limit: MAX_INPUT_CHARS,
                    })
                } else {
                    Ok(text.as_str())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_at_limit_accepted() {
        let input = SourceInput::text("x".repeat(MAX_INPUT_CHARS));
        assert!(input.checked().is_ok());
    }

    #[test]
    fn test_text_over_limit_rejected() {
        let input = SourceInput::text("x".repeat(MAX_INPUT_CHARS + 1));
        match input.checked() {
            Err(ParseError::InputTooLarge { length, limit }) => {
                assert_eq!(length, MAX_INPUT_CHARS + 1);
                assert_eq!(limit, MAX_INPUT_CHARS);
            }
            other => panic!("expected InputTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        // 1000 two-byte characters are 2000 bytes but still within the limit.
        let input = SourceInput::text("é".repeat(MAX_INPUT_CHARS));
        assert!(input.checked().is_ok());
    }

    #[test]
    fn test_trusted_skips_limit() {
        let long = "x".repeat(MAX_INPUT_CHARS * 3);
        let input = SourceInput::trusted(long.clone());
        assert!(input.is_trusted());
        assert_eq!(input.checked().ok(), Some(long.as_str()));
    }
}
