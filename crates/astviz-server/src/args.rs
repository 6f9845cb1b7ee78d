//! Command-line argument definitions for the astviz server.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control configuration file selection, the
//! listen address, logging verbosity and the one-shot self-check.

use clap::Parser;

/// Command-line arguments for the astviz server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Address to listen on, overriding the configuration file
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Render a built-in sample program and exit
    #[arg(long)]
    pub check: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["astviz"]);
        assert!(args.config.is_none());
        assert!(args.listen.is_none());
        assert_eq!(args.log_level, "info");
        assert!(!args.check);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::parse_from([
            "astviz",
            "--config",
            "astviz.toml",
            "--listen",
            "0.0.0.0:9000",
            "--log-level",
            "debug",
            "--check",
        ]);
        assert_eq!(args.config.as_deref(), Some("astviz.toml"));
        assert_eq!(args.listen.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(args.log_level, "debug");
        assert!(args.check);
    }
}
