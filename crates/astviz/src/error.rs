//! Error types for astviz operations.
//!
//! [`AstvizError`] is the single error returned by every visualization
//! stage. Failures of the parse and serialize stages are first collected in
//! [`ProcessingError`] and wrapped exactly once at the pipeline boundary.

use std::{io, path::PathBuf};

use thiserror::Error;

use astviz_parser::{ParseError, serialize::SerializeError};

use crate::export::RenderError;

/// The main error type for astviz operations.
#[derive(Debug, Error)]
pub enum AstvizError {
    /// Parsing or serializing the source failed.
    #[error("Error parsing AST: {0}")]
    AstProcessing(#[from] ProcessingError),

    /// The pipeline grew the heap past the configured ceiling.
    #[error("Memory usage exceeded limit of {limit_mb}MB (used: {used_mb:.2}MB)")]
    MemoryLimitExceeded { limit_mb: u64, used_mb: f64 },

    /// The renderer failed to produce an image.
    #[error("Error generating AST: {0}")]
    Render(String),

    /// Rendering reported success but no image is present.
    #[error("Failed to generate AST image: {} is missing", .0.display())]
    MissingArtifact(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<RenderError> for AstvizError {
    fn from(error: RenderError) -> Self {
        Self::Render(error.to_string())
    }
}

/// Failure of the parse or serialize stage.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),
}
