//! astviz - Render Python syntax trees as images.
//!
//! The visualization pipeline parses Python source, serializes the syntax
//! tree into a generic record form, rebuilds a labeled parent/child graph
//! from that form and renders the graph to a PNG file. The whole sequence
//! runs inside a memory budget.

pub mod artifact;
pub mod budget;
pub mod config;

mod builder;
mod error;
mod export;

pub use astviz_core::graph::{AstGraph, GraphNode, NodeId};
pub use astviz_parser::{MAX_INPUT_CHARS, ParseError, SourceInput, Value, ValueExt};

pub use artifact::{Artifact, ArtifactStore, StagedArtifact};
pub use builder::{DETAIL_KEYS, build_graph};
pub use error::{AstvizError, ProcessingError};
pub use export::{
    RenderError, Renderer,
    graphviz::{GraphvizRenderer, to_dot},
};

use std::path::Path;

use log::{debug, info, trace};

use astviz_parser::serialize;

use budget::MemoryBudget;
use config::VisualizeConfig;

/// Runs the visualization pipeline.
///
/// # Examples
///
/// ```rust,no_run
/// use astviz::{ArtifactStore, SourceInput, Visualizer, config::VisualizeConfig};
///
/// let visualizer = Visualizer::new(VisualizeConfig::default());
/// let store = ArtifactStore::open("static/images/ast_storage", "static/images/ast_storage")
///     .expect("Failed to open artifact store");
///
/// let artifact = visualizer
///     .visualize(&SourceInput::text("x = 1"), &store)
///     .expect("Failed to visualize");
///
/// println!("{}", artifact.public_path());
/// ```
pub struct Visualizer {
    budget: MemoryBudget,
    renderer: Box<dyn Renderer>,
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new(VisualizeConfig::default())
    }
}

impl Visualizer {
    /// Create a visualizer that renders with Graphviz.
    pub fn new(config: VisualizeConfig) -> Self {
        Self {
            budget: MemoryBudget::new(config.memory_limit_mb()),
            renderer: Box::new(GraphvizRenderer::new()),
        }
    }

    /// Replace the renderer.
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn budget(&self) -> MemoryBudget {
        self.budget
    }

    /// Parse source code into the intermediate record form.
    ///
    /// # Errors
    ///
    /// Returns [`AstvizError::AstProcessing`] if the source cannot be parsed
    /// or the resulting tree cannot be serialized.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use astviz::{SourceInput, ValueExt, Visualizer};
    ///
    /// let record = Visualizer::default()
    ///     .parse(&SourceInput::text("x = 1"))
    ///     .expect("Failed to parse");
    /// assert_eq!(record.type_tag(), Some("Module"));
    /// ```
    pub fn parse(&self, input: &SourceInput) -> Result<Value, AstvizError> {
        debug!(trusted = input.is_trusted(); "Parsing source");
        let record = parse_and_serialize(input)?;
        trace!(type_tags = record.count_type_tags(); "Serialized syntax tree");
        Ok(record)
    }

    /// Rebuild the syntax graph from a record.
    pub fn build_graph(&self, record: &Value) -> AstGraph {
        let mut graph = AstGraph::new();
        build_graph(record, &mut graph);
        debug!(nodes = graph.node_count(); "Graph built");
        graph
    }

    /// Render a syntax graph to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`AstvizError::Render`] if the renderer fails.
    pub fn render(&self, graph: &AstGraph, output: &Path) -> Result<(), AstvizError> {
        self.renderer.render(graph, output)?;
        Ok(())
    }

    /// Run the full pipeline and publish the image in `store`.
    ///
    /// Parsing, graph building and rendering run inside the memory budget.
    /// The image is published only after the budget check passes.
    ///
    /// # Errors
    ///
    /// Returns the [`AstvizError`] of the first failing stage, or
    /// [`AstvizError::MemoryLimitExceeded`] if the budget was exceeded.
    pub fn visualize(
        &self,
        input: &SourceInput,
        store: &ArtifactStore,
    ) -> Result<Artifact, AstvizError> {
        let staged = self.budget.run(|| {
            let record = self.parse(input)?;
            let graph = self.build_graph(&record);
            let staged = store.stage()?;
            self.render(&graph, staged.path())?;
            Ok(staged)
        })?;

        let artifact = store.commit(staged)?;
        info!(file_path = artifact.public_path(); "AST image generated");
        Ok(artifact)
    }
}

fn parse_and_serialize(input: &SourceInput) -> Result<Value, ProcessingError> {
    let tree = astviz_parser::parse(input)?;
    Ok(serialize::to_record(&tree)?)
}
