//! Integration tests for the HTTP API
//!
//! Requests are driven through the router in-process. Images are produced
//! by a stand-in renderer so the tests do not need Graphviz.

use std::{fs, path::Path};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use astviz::{
    ArtifactStore, AstGraph, RenderError, Renderer, Visualizer, config::VisualizeConfig,
};
use astviz_core::alloc::TrackingAllocator;
use astviz_server::{AppState, build_router};

#[global_allocator]
static ALLOCATOR: TrackingAllocator = TrackingAllocator::new();

struct StubRenderer;

impl Renderer for StubRenderer {
    fn render(&self, graph: &AstGraph, output: &Path) -> Result<(), RenderError> {
        fs::write(output, format!("{} nodes", graph.node_count()))?;
        Ok(())
    }
}

/// Reports success without writing anything.
struct SilentRenderer;

impl Renderer for SilentRenderer {
    fn render(&self, _graph: &AstGraph, _output: &Path) -> Result<(), RenderError> {
        Ok(())
    }
}

struct TestApp {
    static_dir: TempDir,
    router: Router,
}

impl TestApp {
    fn new(visualizer: Visualizer) -> Self {
        let static_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let store = ArtifactStore::open(
            static_dir.path().join("images/ast_storage"),
            "static/images/ast_storage",
        )
        .expect("Failed to open store");
        let router = build_router(AppState::new(visualizer, store), static_dir.path());
        Self { static_dir, router }
    }

    fn with_stub() -> Self {
        Self::new(Visualizer::default().with_renderer(StubRenderer))
    }

    fn artifact_count(&self) -> usize {
        fs::read_dir(self.static_dir.path().join("images/ast_storage"))
            .expect("Failed to read artifact directory")
            .count()
    }

    async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).expect("Valid request"))
            .await
            .expect("Router is infallible");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, body.to_vec())
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.get(uri).await;
        let json = serde_json::from_slice(&body).expect("Body should be JSON");
        (status, json)
    }
}

fn visualize_uri(input_code: &str) -> String {
    let mut uri = String::from("/api/ast/visualize?input_code=");
    for byte in input_code.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            uri.push(byte as char);
        } else {
            uri.push_str(&format!("%{byte:02X}"));
        }
    }
    uri
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::with_stub();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_visualize_success() {
    let app = TestApp::with_stub();
    let (status, json) = app.get_json(&visualize_uri("x = 1")).await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["input_code"], "x = 1");
    assert_eq!(json["message"], "AST image successfully generated.");

    let file_path = json["file_path"].as_str().expect("file_path is a string");
    assert!(file_path.starts_with("static/images/ast_storage/ast_"));
    assert!(file_path.ends_with(".png"));
    assert_eq!(app.artifact_count(), 1);

    // The returned path is served back.
    let (status, body) = app.get(&format!("/{file_path}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"4 nodes");
}

#[tokio::test]
async fn test_identical_requests_produce_distinct_files() {
    let app = TestApp::with_stub();
    let uri = visualize_uri("print('hi')");

    let (_, first) = app.get_json(&uri).await;
    let (_, second) = app.get_json(&uri).await;

    assert_ne!(first["file_path"], second["file_path"]);
    assert_eq!(app.artifact_count(), 2);
}

#[tokio::test]
async fn test_missing_input_code_is_unprocessable() {
    let app = TestApp::with_stub();
    let (status, json) = app.get_json("/api/ast/visualize").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["detail"].as_str().unwrap().contains("input_code"));
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_oversized_input_is_unprocessable() {
    let app = TestApp::with_stub();

    let (status, _) = app.get_json(&visualize_uri(&"1".repeat(1000))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app.get_json(&visualize_uri(&"1".repeat(1001))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["detail"].as_str().unwrap().contains("1000"));
    assert_eq!(app.artifact_count(), 1);
}

#[tokio::test]
async fn test_syntax_error_is_bad_request() {
    let app = TestApp::with_stub();
    let (status, json) = app.get_json(&visualize_uri("def broken(:")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        json["detail"]
            .as_str()
            .unwrap()
            .starts_with("Error parsing AST: ")
    );
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_memory_limit_is_payload_too_large() {
    let app = TestApp::new(Visualizer::new(VisualizeConfig::new(0)).with_renderer(StubRenderer));
    let (status, json) = app.get_json(&visualize_uri("x = [1, 2, 3]")).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(
        json["detail"]
            .as_str()
            .unwrap()
            .starts_with("Memory usage exceeded limit of 0MB")
    );
    assert!(json.get("file_path").is_none());
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_renderer_without_output_is_server_error() {
    let app = TestApp::new(Visualizer::default().with_renderer(SilentRenderer));
    let (status, json) = app.get_json(&visualize_uri("x = 1")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["detail"], "Failed to generate AST image.");
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_deeply_nested_input_is_bad_request() {
    let app = TestApp::with_stub();
    let source = format!("{}{}", "[".repeat(500), "]".repeat(500));
    let (status, json) = app.get_json(&visualize_uri(&source)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error parsing AST: "), "{detail}");
    assert!(detail.contains("nested too deeply"), "{detail}");
    assert_eq!(app.artifact_count(), 0);

    // The server keeps answering afterwards.
    let (status, _) = app.get_json(&visualize_uri("x = 1")).await;
    assert_eq!(status, StatusCode::OK);
}
