//! Request tracking: the single write path into the registry from the
//! serving layer.

use std::sync::Arc;

use super::labels::LabelSet;
use super::registry::MetricsRegistry;

/// Records the outcome of completed HTTP requests into the shared registry.
#[derive(Clone)]
pub struct RequestTracker {
    registry: Arc<MetricsRegistry>,
}

impl RequestTracker {
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    /// Record one completed request.
    ///
    /// Must be called exactly once per request after the response (or
    /// failure) is finalized; failed requests are reported with status 500
    /// by the caller. Increments the request counter, observes the latency
    /// histogram, and counts an error when `status_code >= 400`, all under
    /// the same `{method, path, status}` labels.
    pub fn track(&self, method: &str, path: &str, status_code: u16, duration_seconds: f64) {
        let status = status_code.to_string();
        let labels = LabelSet::from_pairs(&[
            ("method", method),
            ("path", path),
            ("status", &status),
        ]);

        self.registry.http_requests_total.inc(&labels);
        self.registry
            .http_request_duration_seconds
            .observe(duration_seconds, &labels);

        if status_code >= 400 {
            self.registry.http_errors_total.inc(&labels);
        }
    }

    /// Mark a request as in flight. Paired with [`request_finished`], which
    /// the serving layer guarantees via a drop guard.
    ///
    /// [`request_finished`]: Self::request_finished
    pub fn request_started(&self) {
        self.registry.http_active_requests.inc(&LabelSet::empty());
    }

    pub fn request_finished(&self) {
        self.registry.http_active_requests.dec(&LabelSet::empty());
    }
}
