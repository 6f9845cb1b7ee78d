//! astviz server library
//!
//! HTTP front end for the astviz visualization pipeline, plus the
//! configuration loading and self-check used by the `astviz` binary.

pub mod api;
pub mod config;
pub mod http;

mod args;
mod error;

pub use args::Args;
pub use error::ServerError;

use std::{env, path::Path, sync::Arc};

use axum::{Router, routing::get};
use log::{LevelFilter, info};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use astviz::{Artifact, ArtifactStore, SourceInput, Visualizer, config::AppConfig};

/// Program rendered by `--check`.
pub const SAMPLE_PROGRAM: &str = "\
for i in range(42):
    j = i ** 2
    print(f\"{i} squared is {j}\")
";

/// Shared state of the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub visualizer: Arc<Visualizer>,
    pub store: Arc<ArtifactStore>,
}

impl AppState {
    pub fn new(visualizer: Visualizer, store: ArtifactStore) -> Self {
        Self {
            visualizer: Arc::new(visualizer),
            store: Arc::new(store),
        }
    }

    /// Builds the state described by `config`, creating the artifact
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the artifact directory cannot be created.
    pub fn from_config(config: &AppConfig) -> Result<Self, ServerError> {
        let store = open_store(config)?;
        let visualizer = Visualizer::new(config.visualize().clone());
        Ok(Self::new(visualizer, store))
    }
}

/// Builds the HTTP router.
///
/// Routes:
/// - `GET /api/ast/visualize` renders `input_code`
/// - `GET /health` liveness probe
/// - `GET /static/...` files under `static_dir`
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/ast/visualize", get(api::visualize_ast))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .with_state(state)
}

/// Logger with `log_level` as the base level.
///
/// `env_filters` uses `RUST_LOG` syntax and is applied on top, so a global
/// level given there replaces `log_level` and per-module directives refine it.
pub fn logger(log_level: LevelFilter, env_filters: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log_level);
    if let Some(filters) = env_filters {
        builder.parse_filters(filters);
    }
    builder
}

/// Run the astviz server
///
/// Loads the configuration, applies overrides and either runs the self-check
/// or serves HTTP until interrupted.
///
/// # Errors
///
/// Returns `ServerError` for configuration, bind or I/O failures, and for a
/// failing self-check.
pub fn run(args: &Args) -> Result<(), ServerError> {
    let mut app_config = config::load_config(args.config.as_ref())?;
    let memory_limit = env::var(config::MEMORY_LIMIT_ENV).ok();
    config::apply_overrides(&mut app_config, args.listen.as_deref(), memory_limit.as_deref())?;

    if args.check {
        run_check(&app_config)?;
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(app_config))
}

/// Serve HTTP until Ctrl-C.
///
/// # Errors
///
/// Returns `ServerError` if the artifact directory cannot be created, the
/// listen address cannot be bound or the server fails.
pub async fn serve(config: AppConfig) -> Result<(), ServerError> {
    let state = AppState::from_config(&config)?;
    let app = build_router(state, config.server().static_dir());

    let addr = config.server().listen().to_string();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!(
        addr,
        static_dir = config.server().static_dir().display().to_string(),
        memory_limit_mb = config.visualize().memory_limit_mb();
        "astviz listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Render [`SAMPLE_PROGRAM`] through the trusted input path.
///
/// # Errors
///
/// Returns `ServerError` if the artifact directory cannot be created or the
/// pipeline fails, e.g. because Graphviz is not installed.
pub fn run_check(config: &AppConfig) -> Result<Artifact, ServerError> {
    let state = AppState::from_config(config)?;
    let artifact = state
        .visualizer
        .visualize(&SourceInput::trusted(SAMPLE_PROGRAM), &state.store)?;

    info!(file_path = artifact.public_path(); "Self-check succeeded");
    Ok(artifact)
}

fn open_store(config: &AppConfig) -> Result<ArtifactStore, ServerError> {
    let server = config.server();
    Ok(ArtifactStore::open(
        server.artifact_dir(),
        server.public_artifact_prefix(),
    )?)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler the server runs until killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_uses_log_level_without_env_filters() {
        assert_eq!(logger(LevelFilter::Info, None).build().filter(), LevelFilter::Info);
        assert_eq!(logger(LevelFilter::Warn, None).build().filter(), LevelFilter::Warn);
    }

    #[test]
    fn test_logger_env_filters_override_log_level() {
        let logger_with = |filters: &str| logger(LevelFilter::Info, Some(filters)).build().filter();

        assert_eq!(logger_with("debug"), LevelFilter::Debug);
        assert_eq!(logger_with("error"), LevelFilter::Error);
        assert_eq!(logger_with("astviz=trace"), LevelFilter::Trace);
    }
}
