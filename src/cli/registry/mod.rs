//! Registry commands

use clap::Args;
use serde_json::json;
use tracing::info;

use crate::cli::{bootstrap, print_json};
use crate::domain::model::ModelRecord;

/// Arguments for the list command
#[derive(Args, Clone)]
pub struct ListArgs {
    /// Only models for this symbol, newest first
    #[arg(long)]
    pub symbol: Option<String>,
}

/// Arguments for the activate command
#[derive(Args, Clone)]
pub struct ActivateArgs {
    /// Trading symbol, e.g. BTC
    pub symbol: String,

    /// Registered model id
    pub model_id: String,
}

/// Scan the configured artifact directory
pub async fn discover() -> anyhow::Result<()> {
    let (config, _) = bootstrap();
    let registry = crate::open_registry(&config).await;

    let added = registry.discover(&config.registry.artifact_dir).await?;
    info!(added, dir = %config.registry.artifact_dir.display(), "Discovery finished");

    print_json(&json!({
        "added": added,
        "total": registry.len().await,
        "symbols": registry.symbols().await,
    }))
}

/// Prune records whose artifact file has disappeared
pub async fn validate() -> anyhow::Result<()> {
    let (config, _) = bootstrap();
    let registry = crate::open_registry(&config).await;

    let removed = registry.validate().await;

    print_json(&json!({
        "removed": removed,
        "total": registry.len().await,
    }))
}

/// Print registered models
pub async fn list(args: ListArgs) -> anyhow::Result<()> {
    let (config, _) = bootstrap();
    let registry = crate::open_registry(&config).await;

    let records: Vec<ModelRecord> = match &args.symbol {
        Some(symbol) => registry.list_for_symbol(symbol).await,
        None => registry.list_all().await,
    };

    print_json(&records)
}

/// Switch the active model of a symbol
pub async fn activate(args: ActivateArgs) -> anyhow::Result<()> {
    let (config, _) = bootstrap();
    let registry = crate::open_registry(&config).await;

    registry.set_active(&args.symbol, &args.model_id).await?;

    let active = registry.get_active(&args.symbol).await;
    print_json(&active)
}
