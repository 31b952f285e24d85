//! Inspect command - loads a model through the cache and reports on it

use clap::Args;
use serde_json::json;
use tracing::warn;

use crate::cli::{bootstrap, print_json};
use crate::domain::model::Tensor;

/// Arguments for the inspect command
#[derive(Args, Clone)]
pub struct InspectArgs {
    /// Trading symbol, e.g. BTC
    pub symbol: String,

    /// Load this model instead of the active one
    #[arg(long)]
    pub model_id: Option<String>,

    /// Also print Prometheus metrics
    #[arg(long)]
    pub metrics: bool,
}

/// Run the inspect command
pub async fn run(args: InspectArgs) -> anyhow::Result<()> {
    let (config, metrics) = bootstrap();
    let cache = crate::create_model_cache(&config).await?;

    let model = cache
        .get(&args.symbol, args.model_id.as_deref(), false)
        .await;

    let loaded = match &model {
        Some(model) => {
            let shape = model.input_shape();
            let probe = model.infer(&Tensor::zeros(vec![
                shape.sequence_length,
                shape.feature_count,
            ]))?;

            json!({
                "symbol": model.symbol(),
                "model_id": model.model_id(),
                "input_shape": shape,
                "output_size": model.handle().output_size(),
                "zero_input_output": probe.data(),
            })
        }
        None => {
            warn!(symbol = %args.symbol, "No model could be served");
            serde_json::Value::Null
        }
    };

    let health = cache.health_check().await;

    print_json(&json!({
        "model": loaded,
        "health": health,
        "stats": cache.stats().await,
        "entries": cache.entries().await,
    }))?;

    if args.metrics {
        match metrics {
            Some(metrics) => println!("{}", metrics.render()),
            None => warn!("Metrics are disabled in configuration"),
        }
    }

    Ok(())
}
