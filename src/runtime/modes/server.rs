//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::warn;

use crate::api::middleware::{RequestIdMiddleware, TimingMiddleware};
use crate::api::services::{health_routes, metrics_routes, stats_routes, task_routes};
use crate::runtime::lifetime;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub server_host: String,
    pub server_port: u16,
}

/// Run the HTTP server
///
/// This function:
/// 1. Prepares server components (repository, metrics registry, routes)
/// 2. Configures and starts the HTTP server
/// 3. Listens for graceful shutdown signals
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    // Prepare server startup (repository, metrics, routes)
    let startup = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let repository = startup.repository.clone();
    let registry = startup.registry.clone();
    let tracker = startup.tracker.clone();
    let route = startup.route_config.clone();

    let api_prefix = route.api_prefix;
    let health_prefix = route.health_prefix;

    let config = crate::config::get_config();
    let server_config = ServerConfig {
        server_host: config.server.host.clone(),
        server_port: config.server.port,
    };

    let cpu_count = config.server.cpu_count.min(32);
    warn!("Using {} CPU cores for the server", cpu_count);

    // Registry reference for the shutdown summary, before the Arc moves
    // into the HttpServer closure
    let registry_for_shutdown = registry.clone();

    // Configure HTTP server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TimingMiddleware::new(tracker.clone())) // times and tracks every request
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .app_data(web::Data::new(repository.clone()))
            .app_data(web::Data::new(registry.clone()))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(
                web::scope(&api_prefix)
                    .service(task_routes())
                    .service(stats_routes()),
            )
            .service(web::scope(&health_prefix).service(health_routes()))
            .service(metrics_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!(
        "{}:{}",
        server_config.server_host, server_config.server_port
    );
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(bind_address)?.run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(registry_for_shutdown) => {
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}
