//! Configuration file loading for the server
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory)
//! and applying command-line and environment overrides on top.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use astviz::config::AppConfig;

/// Environment variable overriding `visualize.memory_limit_mb`.
pub const MEMORY_LIMIT_ENV: &str = "MEMORY_LIMIT_MB";

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (astviz/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("astviz/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "astviz", "astviz") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Apply command-line and environment overrides.
///
/// `memory_limit_mb` is the raw value of [`MEMORY_LIMIT_ENV`], if set.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] if the memory limit is not a
/// non-negative integer.
pub fn apply_overrides(
    config: &mut AppConfig,
    listen: Option<&str>,
    memory_limit_mb: Option<&str>,
) -> Result<(), ConfigError> {
    if let Some(listen) = listen {
        debug!(listen; "Overriding listen address");
        config.server_mut().set_listen(listen);
    }

    if let Some(raw) = memory_limit_mb {
        let limit = raw.trim().parse::<u64>().map_err(|err| {
            ConfigError::Validation(format!("{MEMORY_LIMIT_ENV}={raw:?} is not a valid limit: {err}"))
        })?;
        debug!(memory_limit_mb = limit; "Overriding memory limit from environment");
        config.visualize_mut().set_memory_limit_mb(limit);
    }

    Ok(())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}
