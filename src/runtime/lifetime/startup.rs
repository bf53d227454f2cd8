use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::metrics::{MetricsRegistry, RequestTracker};
use crate::repository::{RepositoryFactory, TaskRepository};

pub struct StartupContext {
    pub repository: Arc<dyn TaskRepository>,
    pub registry: Arc<MetricsRegistry>,
    pub tracker: Arc<RequestTracker>,
    pub route_config: RouteConfig,
}

#[derive(Clone, Debug)]
pub struct RouteConfig {
    pub api_prefix: String,
    pub health_prefix: String,
}

/// Prepare the server startup context: repository, metrics registry and
/// request tracker, route configuration.
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let repository = RepositoryFactory::create().context("Failed to create task repository")?;
    info!("Using repository backend: {}", repository.backend_name());

    // The registry is constructed exactly once here and shared by Arc;
    // everything that records or reads metrics gets this instance injected.
    let registry = Arc::new(MetricsRegistry::new());
    let tracker = Arc::new(RequestTracker::new(registry.clone()));
    debug!("Metrics registry initialized");

    let config = crate::config::get_config();
    let route_config = RouteConfig {
        api_prefix: config.api.prefix.clone(),
        health_prefix: config.api.health_prefix.clone(),
    };

    info!("Task API available at: {}", route_config.api_prefix);
    info!("Health API available at: {}", route_config.health_prefix);
    info!("Metrics available at: /metrics and /metrics/json");

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        repository,
        registry,
        tracker,
        route_config,
    })
}
