//! Application metrics registry
//!
//! Owns the fixed set of HTTP instruments and the process start time.
//! Constructed once at startup and shared by `Arc` through the serving
//! layer; there is deliberately no global singleton.

use std::time::Instant;

use super::counter::Counter;
use super::export::{self, MetricsReport};
use super::gauge::Gauge;
use super::histogram::Histogram;

/// Registry for all application metrics.
///
/// Each instrument guards its own series map with its own lock, and no
/// operation ever holds two instrument locks at once. Reads of a single
/// instrument are consistent at a point in time; a combined export may see
/// different instruments at slightly different instants under concurrent
/// writers. That staleness is accepted, it never shows a torn view within
/// one instrument.
pub struct MetricsRegistry {
    started: Instant,

    /// Total number of HTTP requests by method/path/status
    pub http_requests_total: Counter,
    /// HTTP request latency distribution
    pub http_request_duration_seconds: Histogram,
    /// Total number of HTTP error responses (status >= 400)
    pub http_errors_total: Counter,
    /// Number of requests currently in flight
    pub http_active_requests: Gauge,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            http_requests_total: Counter::new(
                "http_requests_total",
                "Total number of HTTP requests",
            ),
            http_request_duration_seconds: Histogram::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            http_errors_total: Counter::new(
                "http_errors_total",
                "Total number of HTTP errors",
            ),
            http_active_requests: Gauge::new(
                "http_active_requests",
                "Number of active HTTP requests",
            ),
        }
    }

    /// Seconds elapsed since the registry was constructed.
    pub fn uptime(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Collect all metrics into the JSON export document.
    pub fn collect_all(&self) -> MetricsReport {
        export::collect_all(self)
    }

    /// Export all metrics in Prometheus text exposition format.
    pub fn to_exposition_text(&self) -> String {
        export::render_exposition(self)
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
