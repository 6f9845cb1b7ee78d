//! Configuration types for the astviz service.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`ServerConfig`] - Listen address and static asset directory.
//! - [`VisualizeConfig`] - Limits applied to each visualization.
//!
//! # Example
//!
//! ```
//! # use astviz::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.visualize().memory_limit_mb(), 10);
//! assert_eq!(config.server().public_artifact_prefix(), "static/images/ast_storage");
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default memory ceiling for one visualization, in megabytes.
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 10;

/// Default listen address of the HTTP server.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";

/// Artifact directory, relative to the static directory.
const ARTIFACT_SUBDIR: &str = "images/ast_storage";

/// URL prefix under which the static directory is served.
const STATIC_ROUTE: &str = "static";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration section.
    #[serde(default)]
    server: ServerConfig,

    /// Visualization configuration section.
    #[serde(default)]
    visualize: VisualizeConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(server: ServerConfig, visualize: VisualizeConfig) -> Self {
        Self { server, visualize }
    }

    /// Returns the server configuration.
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Returns the server configuration for modification.
    pub fn server_mut(&mut self) -> &mut ServerConfig {
        &mut self.server
    }

    /// Returns the visualization configuration.
    pub fn visualize(&self) -> &VisualizeConfig {
        &self.visualize
    }

    /// Returns the visualization configuration for modification.
    pub fn visualize_mut(&mut self) -> &mut VisualizeConfig {
        &mut self.visualize
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_listen")]
    listen: String,

    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            static_dir: default_static_dir(),
        }
    }
}

impl ServerConfig {
    /// Returns the listen address.
    pub fn listen(&self) -> &str {
        &self.listen
    }

    /// Overrides the listen address.
    pub fn set_listen(&mut self, listen: impl Into<String>) {
        self.listen = listen.into();
    }

    /// Returns the static asset directory.
    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    /// Overrides the static asset directory.
    pub fn set_static_dir(&mut self, static_dir: impl Into<PathBuf>) {
        self.static_dir = static_dir.into();
    }

    /// Returns the directory rendered images are written to.
    pub fn artifact_dir(&self) -> PathBuf {
        self.static_dir.join(ARTIFACT_SUBDIR)
    }

    /// Returns the relative URL path under which artifacts are published.
    pub fn public_artifact_prefix(&self) -> String {
        format!("{STATIC_ROUTE}/{ARTIFACT_SUBDIR}")
    }
}

/// Limits applied to each visualization.
#[derive(Debug, Clone, Deserialize)]
pub struct VisualizeConfig {
    /// Maximum heap growth of one pipeline run, in megabytes.
    #[serde(default = "default_memory_limit_mb")]
    memory_limit_mb: u64,
}

impl Default for VisualizeConfig {
    fn default() -> Self {
        Self {
            memory_limit_mb: DEFAULT_MEMORY_LIMIT_MB,
        }
    }
}

impl VisualizeConfig {
    /// Creates a configuration with the given memory ceiling.
    pub fn new(memory_limit_mb: u64) -> Self {
        Self { memory_limit_mb }
    }

    /// Returns the memory ceiling in megabytes.
    pub fn memory_limit_mb(&self) -> u64 {
        self.memory_limit_mb
    }

    /// Overrides the memory ceiling.
    pub fn set_memory_limit_mb(&mut self, memory_limit_mb: u64) {
        self.memory_limit_mb = memory_limit_mb;
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(STATIC_ROUTE)
}

fn default_memory_limit_mb() -> u64 {
    DEFAULT_MEMORY_LIMIT_MB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server().listen(), DEFAULT_LISTEN);
        assert_eq!(config.server().static_dir(), Path::new("static"));
        assert_eq!(
            config.server().artifact_dir(),
            Path::new("static").join("images/ast_storage")
        );
        assert_eq!(config.visualize().memory_limit_mb(), DEFAULT_MEMORY_LIMIT_MB);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [visualize]
            memory_limit_mb = 32
            "#,
        )
        .unwrap();
        assert_eq!(config.visualize().memory_limit_mb(), 32);
        assert_eq!(config.server().listen(), DEFAULT_LISTEN);
    }

    #[test]
    fn test_full_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            listen = "0.0.0.0:9000"
            static_dir = "/srv/astviz/static"
            "#,
        )
        .unwrap();
        assert_eq!(config.server().listen(), "0.0.0.0:9000");
        assert_eq!(
            config.server().artifact_dir(),
            Path::new("/srv/astviz/static/images/ast_storage")
        );
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.server_mut().set_listen("127.0.0.1:0");
        config.visualize_mut().set_memory_limit_mb(1);
        assert_eq!(config.server().listen(), "127.0.0.1:0");
        assert_eq!(config.visualize().memory_limit_mb(), 1);
    }
}
