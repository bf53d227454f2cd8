//! HTTP timing middleware
//!
//! The single integration point between the serving layer and the metrics
//! registry: brackets every request with the active-request gauge and
//! reports each completed request to the `RequestTracker` exactly once.

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::RequestTracker;

/// Drop guard that decrements the active-request gauge when dropped.
/// Ensures the decrement runs even if the handler future panics.
struct ActiveRequestGuard {
    tracker: Arc<RequestTracker>,
}

impl Drop for ActiveRequestGuard {
    fn drop(&mut self) {
        self.tracker.request_finished();
    }
}

/// HTTP timing middleware factory
#[derive(Clone)]
pub struct TimingMiddleware {
    tracker: Arc<RequestTracker>,
}

impl TimingMiddleware {
    pub fn new(tracker: Arc<RequestTracker>) -> Self {
        Self { tracker }
    }
}

impl<S, B> Transform<S, ServiceRequest> for TimingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TimingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TimingService {
            service: Rc::new(service),
            tracker: self.tracker.clone(),
        }))
    }
}

pub struct TimingService<S> {
    service: Rc<S>,
    tracker: Arc<RequestTracker>,
}

impl<S, B> Service<ServiceRequest> for TimingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let tracker = self.tracker.clone();
        let start = Instant::now();

        let method = method_str(req.method());
        // Routing hasn't run yet; keep the raw path for the error case.
        let raw_path = req.path().to_string();

        Box::pin(async move {
            tracker.request_started();
            // Guard ensures the gauge is decremented even on panic
            let _guard = ActiveRequestGuard {
                tracker: tracker.clone(),
            };

            let result = srv.call(req).await;
            let duration = start.elapsed().as_secs_f64();

            match &result {
                Ok(response) => {
                    // Matched route pattern keeps the path label space bounded
                    let path = response
                        .request()
                        .match_pattern()
                        .unwrap_or_else(|| raw_path.clone());
                    tracker.track(method, &path, response.status().as_u16(), duration);
                }
                Err(_) => {
                    // Handler errors are reported as 500
                    tracker.track(method, &raw_path, 500, duration);
                }
            }

            result
        })
    }
}

/// Map HTTP method to a static string (avoids allocation).
fn method_str(method: &actix_web::http::Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        "PATCH" => "PATCH",
        _ => "OTHER",
    }
}
