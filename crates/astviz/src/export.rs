pub mod graphviz;

use std::{io, path::Path};

use astviz_core::graph::AstGraph;

/// Writes an image of a syntax graph to a file.
///
/// Implementations either leave a complete image at `output` or return an
/// error; on error the caller discards whatever was written.
pub trait Renderer: Send + Sync {
    fn render(&self, graph: &AstGraph, output: &Path) -> Result<(), RenderError>;
}

#[derive(Debug)]
pub enum RenderError {
    Graphviz(io::Error),
    Io(io::Error),
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graphviz(err) => write!(f, "graphviz failed: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Graphviz(err) | Self::Io(err) => Some(err),
        }
    }
}
