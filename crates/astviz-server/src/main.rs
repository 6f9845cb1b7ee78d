//! astviz server entry point.

use std::{env, process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use astviz_core::alloc::TrackingAllocator;
use astviz_server::Args;

#[global_allocator]
static ALLOCATOR: TrackingAllocator = TrackingAllocator::new();

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    let env_filters = env::var(env_logger::DEFAULT_FILTER_ENV).ok();
    astviz_server::logger(log_level, env_filters.as_deref()).init();

    info!(log_level:?; "Starting astviz");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = astviz_server::run(&args) {
        error!(err:err; "Failed");
        process::exit(1);
    }

    info!("Completed successfully");
}
