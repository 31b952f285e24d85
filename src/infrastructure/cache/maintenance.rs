//! Periodic cache upkeep

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::model_cache::ModelCache;
use crate::domain::DomainError;

/// Background task sweeping expired entries, re-checking health and pruning the registry
///
/// The task stops on [`MaintenanceHandle::shutdown`] or when the handle is dropped.
#[derive(Debug)]
pub struct MaintenanceHandle {
    task: Option<JoinHandle<()>>,
}

impl MaintenanceHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the task and waits for it to wind down
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            info!("Cache maintenance stopped");
        }
    }
}

impl Drop for MaintenanceHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Starts maintenance with the first pass one `period` from now
///
/// A zero `period` is rejected with `DomainError::Configuration`.
pub fn spawn_maintenance(
    cache: Arc<ModelCache>,
    period: Duration,
) -> Result<MaintenanceHandle, DomainError> {
    if period.is_zero() {
        return Err(DomainError::configuration(
            "Cache maintenance period must be positive",
        ));
    }

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_pass(&cache).await;
        }
    });

    info!(period_secs = period.as_secs(), "Cache maintenance started");
    Ok(MaintenanceHandle { task: Some(task) })
}

async fn run_pass(cache: &ModelCache) {
    let pruned = cache.registry().validate().await;
    let expired = cache.sweep_expired().await;
    let report = cache.health_check().await;

    debug!(
        pruned,
        expired,
        removed = report.removed.len(),
        "Cache maintenance pass complete"
    );
}
