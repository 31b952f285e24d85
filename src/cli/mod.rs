//! CLI module for PMP Model Cache
//!
//! Operator subcommands over the model registry and cache:
//! - `discover`, `validate`, `list`, `activate`: registry maintenance
//! - `inspect`: load a symbol's model through the cache and report on it

pub mod inspect;
pub mod registry;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::observability::{init_metrics, PrometheusMetrics};

/// PMP Model Cache - registry and cache for per-symbol inference models
#[derive(Parser)]
#[command(name = "pmp-model-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan the artifact directory and register new models
    Discover,

    /// Drop registry records whose artifact is missing
    Validate,

    /// List registered models
    List(registry::ListArgs),

    /// Make a model the active one for its symbol
    Activate(registry::ActivateArgs),

    /// Load a symbol's model through the cache and print a report
    Inspect(inspect::InspectArgs),
}

/// Shared startup: `.env`, configuration, logging and the metrics recorder
pub(crate) fn bootstrap() -> (AppConfig, Option<PrometheusMetrics>) {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);
    let metrics = init_metrics(&config.metrics);

    (config, metrics)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
