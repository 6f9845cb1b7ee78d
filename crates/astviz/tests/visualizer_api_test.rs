//! Integration tests for the Visualizer API
//!
//! This binary installs the tracking allocator, so memory budgets are
//! enforced here.

use std::{fs, path::Path, process::Command};

use astviz::{
    ArtifactStore, AstGraph, AstvizError, GraphvizRenderer, RenderError, Renderer, SourceInput,
    Visualizer, config::VisualizeConfig,
};
use astviz_core::alloc::{self, TrackingAllocator};

#[global_allocator]
static ALLOCATOR: TrackingAllocator = TrackingAllocator::new();

/// Writes one line per node instead of an image.
struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, graph: &AstGraph, output: &Path) -> Result<(), RenderError> {
        let text: String = graph
            .nodes()
            .map(|node| format!("{}\n", node.label().replace('\n', " ")))
            .collect();
        fs::write(output, text)?;
        Ok(())
    }
}

fn open_store(root: &Path) -> ArtifactStore {
    ArtifactStore::open(root.join("images/ast_storage"), "static/images/ast_storage")
        .expect("Failed to open store")
}

fn file_names(store: &ArtifactStore) -> Vec<String> {
    fs::read_dir(store.dir())
        .expect("Failed to read store")
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect()
}

fn graphviz_available() -> bool {
    Command::new("dot").arg("-V").output().is_ok()
}

#[test]
fn test_allocator_installed() {
    assert!(alloc::is_installed());
}

#[test]
fn test_visualize_simple_program() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let store = open_store(temp_dir.path());
    let visualizer = Visualizer::default().with_renderer(TextRenderer);

    let artifact = visualizer
        .visualize(&SourceInput::text("x = 1"), &store)
        .expect("Failed to visualize");

    assert!(artifact.name().starts_with("ast_"));
    assert!(artifact.name().ends_with(".png"));
    assert_eq!(
        artifact.public_path(),
        format!("static/images/ast_storage/{}", artifact.name())
    );
    assert_eq!(
        fs::read_to_string(artifact.path()).expect("Failed to read artifact"),
        "Module\nAssignment\nIdentifier id: x\nInteger n: 1\n"
    );
    assert_eq!(file_names(&store), vec![artifact.name().to_string()]);
}

#[test]
fn test_memory_limit_exceeded_leaves_no_artifact() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let store = open_store(temp_dir.path());
    let visualizer = Visualizer::new(VisualizeConfig::new(0)).with_renderer(TextRenderer);

    let err = visualizer
        .visualize(&SourceInput::text("x = [1, 2, 3]"), &store)
        .expect_err("Budget of zero should be exceeded");

    match err {
        AstvizError::MemoryLimitExceeded { limit_mb, used_mb } => {
            assert_eq!(limit_mb, 0);
            assert!(used_mb > 0.0);
        }
        other => panic!("Expected MemoryLimitExceeded, got {other:?}"),
    }
    assert!(file_names(&store).is_empty());
}

#[test]
fn test_default_budget_fits_maximal_input() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let store = open_store(temp_dir.path());
    let visualizer = Visualizer::default().with_renderer(TextRenderer);

    let line = "total = total + values[index] * 2\n";
    let source = line.repeat(1000 / line.len());
    assert!(source.len() <= 1000);

    visualizer
        .visualize(&SourceInput::text(source), &store)
        .expect("Default budget should fit a maximal input");
    assert_eq!(file_names(&store).len(), 1);
}

#[test]
fn test_errors_leave_no_artifact() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let store = open_store(temp_dir.path());
    let visualizer = Visualizer::default().with_renderer(TextRenderer);

    let oversized = "a".repeat(1001);
    for source in ["def broken(:", "x = [1, 2", oversized.as_str()] {
        let result = visualizer.visualize(&SourceInput::text(source), &store);
        assert!(
            matches!(result, Err(AstvizError::AstProcessing(_))),
            "{source:?} should fail to parse"
        );
    }
    assert!(file_names(&store).is_empty());
}

#[test]
fn test_graphviz_renders_png() {
    if !graphviz_available() {
        eprintln!("skipping: graphviz `dot` is not on PATH");
        return;
    }

    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let store = open_store(temp_dir.path());
    let visualizer = Visualizer::default().with_renderer(GraphvizRenderer::new());

    let artifact = visualizer
        .visualize(
            &SourceInput::text("for i in range(3):\n    print(f\"{i}: {i ** 2}\")\n"),
            &store,
        )
        .expect("Failed to render with graphviz");

    let bytes = fs::read(artifact.path()).expect("Failed to read PNG");
    assert!(bytes.starts_with(b"\x89PNG"), "Output should be a PNG image");
}
