//! Metrics endpoints
//!
//! Exposes the registry in Prometheus text format at `/metrics` and as a
//! JSON document at `/metrics/json`.

use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;

use crate::metrics::MetricsRegistry;

pub struct MetricsService;

impl MetricsService {
    /// Handle Prometheus text export request
    pub async fn prometheus(registry: web::Data<Arc<MetricsRegistry>>) -> impl Responder {
        let output = registry.to_exposition_text();

        HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4; charset=utf-8")
            .body(output)
    }

    /// Handle JSON export request
    pub async fn json(registry: web::Data<Arc<MetricsRegistry>>) -> impl Responder {
        HttpResponse::Ok()
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(registry.collect_all())
    }
}

/// Metrics route configuration
pub fn metrics_routes() -> actix_web::Scope {
    web::scope("/metrics")
        .route("", web::get().to(MetricsService::prometheus))
        .route("/json", web::get().to(MetricsService::json))
}
