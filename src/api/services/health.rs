//! Health check endpoints.
//!
//! The health service talks to the repository directly (not through the
//! task handlers): probes must stay fast and free of business logic so
//! they remain meaningful as k8s-style liveness/readiness targets.

use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, trace};

use crate::metrics::MetricsRegistry;
use crate::repository::TaskRepository;

use super::error_code::ErrorCode;
use super::types::{ApiResponse, HealthResponse};

/// Probe deadline; a slow database counts as unhealthy.
const PING_TIMEOUT_SECS: u64 = 5;

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        repo: web::Data<Arc<dyn TaskRepository>>,
        registry: web::Data<Arc<MetricsRegistry>>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let db_healthy =
            match tokio::time::timeout(Duration::from_secs(PING_TIMEOUT_SECS), repo.ping()).await {
                Ok(Ok(())) => {
                    trace!("Repository health check passed ({})", repo.backend_name());
                    true
                }
                Ok(Err(e)) => {
                    error!("Repository health check failed: {}", e);
                    false
                }
                Err(_) => {
                    error!("Repository health check timeout");
                    false
                }
            };

        let health_data = HealthResponse {
            status: if db_healthy {
                "healthy".to_string()
            } else {
                "unhealthy".to_string()
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: if db_healthy {
                "connected".to_string()
            } else {
                "disconnected".to_string()
            },
            uptime_seconds: registry.uptime(),
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        let health_response = ApiResponse {
            code: if db_healthy {
                ErrorCode::Success as i32
            } else {
                ErrorCode::ServiceUnavailable as i32
            },
            message: if db_healthy {
                "OK".to_string()
            } else {
                "Service Unavailable".to_string()
            },
            data: Some(health_data),
        };

        let response_status = if db_healthy {
            actix_web::http::StatusCode::OK
        } else {
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        };

        info!(
            "Health check completed in {:?}, status: {}",
            start_time.elapsed(),
            if db_healthy { "healthy" } else { "unhealthy" },
        );

        HttpResponse::build(response_status)
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(health_response)
    }

    // Readiness probe, plain 200
    pub async fn readiness_check() -> impl Responder {
        trace!("Received readiness check request");

        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }

    // Liveness probe, basic service availability
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health route configuration
pub fn health_routes() -> actix_web::Scope {
    web::scope("")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
