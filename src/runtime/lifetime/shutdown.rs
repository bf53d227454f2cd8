use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::metrics::{LabelSet, MetricsRegistry};

/// Shutdown timeout in seconds
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

pub async fn listen_for_shutdown(registry: Arc<MetricsRegistry>) {
    // Wait for Ctrl+C
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    let shutdown_result = timeout(
        Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
        log_final_stats(registry),
    )
    .await;

    match shutdown_result {
        Ok(()) => {
            info!("Shutdown tasks completed");
        }
        Err(_) => {
            error!(
                "Shutdown tasks timed out after {} seconds! Forcing exit.",
                SHUTDOWN_TIMEOUT_SECS
            );
            std::process::exit(1);
        }
    }
}

/// Final traffic summary. Metrics are in-memory only and reset on restart,
/// so this log line is the last trace of the process's lifetime totals.
async fn log_final_stats(registry: Arc<MetricsRegistry>) {
    let total_requests: f64 = registry
        .http_requests_total
        .snapshot()
        .iter()
        .map(|(_, value)| value)
        .sum();
    let in_flight = registry.http_active_requests.value(&LabelSet::empty());

    info!(
        "Served {} requests over {:.1}s uptime ({} still in flight)",
        total_requests,
        registry.uptime(),
        in_flight
    );
}
