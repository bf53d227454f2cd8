//! Metrics module tests
//!
//! Tests for the instruments, the registry, the exporters, and request
//! tracking.

use std::sync::Arc;

use taskhub::metrics::{
    Counter, Gauge, Histogram, LabelSet, MetricsRegistry, RequestTracker,
};

fn labels(pairs: &[(&str, &str)]) -> LabelSet {
    LabelSet::from_pairs(pairs)
}

// =============================================================================
// Counter Tests
// =============================================================================

#[test]
fn test_counter_initial_value() {
    let counter = Counter::new("test_counter", "Test description");
    assert_eq!(counter.value(&LabelSet::empty()), 0.0);
}

#[test]
fn test_counter_increment() {
    let counter = Counter::new("test_counter", "Test description");
    counter.inc(&LabelSet::empty());
    assert_eq!(counter.value(&LabelSet::empty()), 1.0);
    counter.inc(&LabelSet::empty());
    assert_eq!(counter.value(&LabelSet::empty()), 2.0);
}

#[test]
fn test_counter_increment_by_value() {
    let counter = Counter::new("test_counter", "Test description");
    counter.inc_by(&LabelSet::empty(), 5.0).unwrap();
    assert_eq!(counter.value(&LabelSet::empty()), 5.0);
    counter.inc_by(&LabelSet::empty(), 0.0).unwrap();
    assert_eq!(counter.value(&LabelSet::empty()), 5.0);
}

#[test]
fn test_counter_value_is_sum_of_increments() {
    let counter = Counter::new("test_counter", "Test description");
    let series = labels(&[("method", "GET")]);

    let mut expected = 0.0;
    for amount in [1.0, 0.5, 2.25, 0.0, 3.0] {
        counter.inc_by(&series, amount).unwrap();
        expected += amount;
        assert_eq!(counter.value(&series), expected);
    }
}

#[test]
fn test_counter_label_canonicalization() {
    let counter = Counter::new("test_counter", "Test description");

    counter.inc(&labels(&[("a", "1"), ("b", "2")]));
    counter.inc(&labels(&[("b", "2"), ("a", "1")]));

    // Both orders accumulate into the same series
    assert_eq!(counter.value(&labels(&[("a", "1"), ("b", "2")])), 2.0);
    assert_eq!(counter.snapshot().len(), 1);
}

#[test]
fn test_counter_independent_label_sets() {
    let counter = Counter::new("test_counter", "Test description");

    counter.inc(&labels(&[("method", "GET"), ("path", "/api")]));
    counter.inc(&labels(&[("method", "POST"), ("path", "/api")]));
    counter.inc(&labels(&[("method", "GET"), ("path", "/api")]));

    assert_eq!(
        counter.value(&labels(&[("method", "GET"), ("path", "/api")])),
        2.0
    );
    assert_eq!(
        counter.value(&labels(&[("method", "POST"), ("path", "/api")])),
        1.0
    );
}

#[test]
fn test_counter_rejects_negative_increment() {
    let counter = Counter::new("test_counter", "Test description");
    let series = labels(&[("method", "GET")]);
    counter.inc(&series);

    let err = counter.inc_by(&series, -1.0).unwrap_err();
    assert!(err.to_string().contains("counters cannot decrease"));

    // State untouched after the rejected call
    assert_eq!(counter.value(&series), 1.0);
}

#[test]
fn test_counter_rejects_non_finite_increment() {
    let counter = Counter::new("test_counter", "Test description");
    assert!(counter.inc_by(&LabelSet::empty(), f64::NAN).is_err());
    assert!(counter.inc_by(&LabelSet::empty(), f64::INFINITY).is_err());
    assert_eq!(counter.value(&LabelSet::empty()), 0.0);
}

// =============================================================================
// Histogram Tests
// =============================================================================

#[test]
fn test_histogram_summary() {
    let histogram = Histogram::new("test_histogram", "Test description");
    histogram.observe(0.5, &LabelSet::empty());
    histogram.observe(1.0, &LabelSet::empty());
    histogram.observe(0.1, &LabelSet::empty());

    let summary = histogram.summary(&LabelSet::empty());
    assert_eq!(summary.count, 3);
    assert!((summary.sum - 1.6).abs() < 1e-9);
    assert!((summary.average - 0.5333).abs() < 0.001);
}

#[test]
fn test_histogram_empty_summary() {
    let histogram = Histogram::new("test_histogram", "Test description");
    let summary = histogram.summary(&LabelSet::empty());
    assert_eq!(summary.count, 0);
    assert_eq!(summary.sum, 0.0);
    assert_eq!(summary.average, 0.0);
}

#[test]
fn test_histogram_with_labels() {
    let histogram = Histogram::new("test_histogram", "Test description");

    histogram.observe(0.5, &labels(&[("path", "/api")]));
    histogram.observe(1.0, &labels(&[("path", "/api")]));
    histogram.observe(0.2, &labels(&[("path", "/health")]));

    assert_eq!(histogram.summary(&labels(&[("path", "/api")])).count, 2);
    assert_eq!(histogram.summary(&labels(&[("path", "/health")])).count, 1);
}

#[test]
fn test_histogram_cumulative_buckets() {
    let histogram =
        Histogram::with_buckets("test_histogram", "Test description", &[0.1, 0.5, 1.0]);

    histogram.observe(0.05, &LabelSet::empty()); // <= all three
    histogram.observe(0.3, &LabelSet::empty()); // <= 0.5, 1.0
    histogram.observe(0.8, &LabelSet::empty()); // <= 1.0
    histogram.observe(2.0, &LabelSet::empty()); // above all buckets

    let snapshot = histogram.snapshot();
    assert_eq!(snapshot.len(), 1);
    let series = &snapshot[0];
    assert_eq!(series.buckets, vec![(0.1, 1), (0.5, 2), (1.0, 3)]);
    // The overflowing observation still counts toward count and sum
    assert_eq!(series.count, 4);
    assert!((series.sum - 3.15).abs() < 1e-9);
}

#[test]
fn test_histogram_bucket_monotonicity() {
    let histogram = Histogram::new("test_histogram", "Test description");
    for value in [0.003, 0.02, 0.07, 0.4, 0.9, 3.0, 20.0] {
        histogram.observe(value, &LabelSet::empty());
    }

    let snapshot = histogram.snapshot();
    let series = &snapshot[0];
    let mut previous = 0;
    for (_, count) in &series.buckets {
        assert!(*count >= previous, "bucket counts must be non-decreasing");
        assert!(*count <= series.count, "bucket count must not exceed total");
        previous = *count;
    }
}

#[test]
fn test_histogram_boundary_value_lands_in_bucket() {
    let histogram =
        Histogram::with_buckets("test_histogram", "Test description", &[0.1, 0.5, 1.0]);
    // An observation equal to a boundary counts into that bucket
    histogram.observe(0.5, &LabelSet::empty());

    let snapshot = histogram.snapshot();
    assert_eq!(snapshot[0].buckets, vec![(0.1, 0), (0.5, 1), (1.0, 1)]);
}

// =============================================================================
// Gauge Tests
// =============================================================================

#[test]
fn test_gauge_set_inc_dec() {
    let gauge = Gauge::new("test_gauge", "Test description");
    gauge.set(10.0, &LabelSet::empty());
    gauge.dec(&LabelSet::empty());
    gauge.dec_by(&LabelSet::empty(), 4.0);
    assert_eq!(gauge.value(&LabelSet::empty()), 5.0);
}

#[test]
fn test_gauge_can_go_negative() {
    let gauge = Gauge::new("test_gauge", "Test description");
    gauge.dec_by(&LabelSet::empty(), 3.0);
    assert_eq!(gauge.value(&LabelSet::empty()), -3.0);
}

#[test]
fn test_gauge_label_isolation() {
    let gauge = Gauge::new("test_gauge", "Test description");

    gauge.set(5.0, &labels(&[("instance", "a")]));
    gauge.set(10.0, &labels(&[("instance", "b")]));
    gauge.inc(&labels(&[("instance", "a")]));

    assert_eq!(gauge.value(&labels(&[("instance", "a")])), 6.0);
    assert_eq!(gauge.value(&labels(&[("instance", "b")])), 10.0);
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_registry_uptime_monotonic() {
    let registry = MetricsRegistry::new();
    let first = registry.uptime();
    std::thread::sleep(std::time::Duration::from_millis(10));
    let second = registry.uptime();
    assert!(second >= first);
    assert!(first >= 0.0);
}

#[test]
fn test_registry_collect_all_shape() {
    let registry = MetricsRegistry::new();
    registry.http_requests_total.inc(&labels(&[
        ("method", "GET"),
        ("path", "/"),
        ("status", "200"),
    ]));

    let report = serde_json::to_value(registry.collect_all()).unwrap();

    assert!(report["uptime_seconds"].is_number());
    let requests = &report["metrics"]["http_requests_total"];
    assert_eq!(requests["name"], "http_requests_total");
    assert_eq!(requests["type"], "counter");
    assert_eq!(requests["values"][0]["labels"]["method"], "GET");
    assert_eq!(requests["values"][0]["value"], 1.0);

    let duration = &report["metrics"]["http_request_duration_seconds"];
    assert_eq!(duration["type"], "histogram");

    assert_eq!(report["metrics"]["http_active_requests"]["type"], "gauge");
}

#[test]
fn test_registry_json_histogram_buckets() {
    let registry = MetricsRegistry::new();
    let series = labels(&[("method", "GET"), ("path", "/x"), ("status", "200")]);
    registry.http_request_duration_seconds.observe(0.03, &series);

    let report = serde_json::to_value(registry.collect_all()).unwrap();
    let values = &report["metrics"]["http_request_duration_seconds"]["values"];
    assert_eq!(values[0]["count"], 1);
    let buckets = values[0]["buckets"].as_object().unwrap();
    // 0.03 lands in every bucket from 0.05 upwards
    assert_eq!(buckets["0.025"], 0);
    assert_eq!(buckets["0.05"], 1);
    assert_eq!(buckets["10"], 1);
}

// =============================================================================
// Exposition Format Tests
// =============================================================================

#[test]
fn test_exposition_structure_for_counter() {
    let registry = MetricsRegistry::new();
    registry.http_requests_total.inc(&labels(&[
        ("method", "GET"),
        ("path", "/x"),
        ("status", "200"),
    ]));

    let output = registry.to_exposition_text();
    let lines: Vec<&str> = output.lines().collect();

    let help_lines: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.starts_with("# HELP http_requests_total"))
        .map(|(i, _)| i)
        .collect();
    let type_lines: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.starts_with("# TYPE http_requests_total"))
        .map(|(i, _)| i)
        .collect();
    let value_lines: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.starts_with("http_requests_total{"))
        .map(|(i, _)| i)
        .collect();

    // Exactly one HELP, one TYPE, one value line, in that order
    assert_eq!(help_lines.len(), 1);
    assert_eq!(type_lines.len(), 1);
    assert_eq!(value_lines.len(), 1);
    assert!(help_lines[0] < type_lines[0]);
    assert!(type_lines[0] < value_lines[0]);

    assert_eq!(
        lines[value_lines[0]],
        "http_requests_total{method=\"GET\",path=\"/x\",status=\"200\"} 1"
    );
}

#[test]
fn test_exposition_instrument_order() {
    let registry = MetricsRegistry::new();
    let output = registry.to_exposition_text();

    let requests = output.find("# HELP http_requests_total").unwrap();
    let duration = output
        .find("# HELP http_request_duration_seconds")
        .unwrap();
    let errors = output.find("# HELP http_errors_total").unwrap();
    let active = output.find("# HELP http_active_requests").unwrap();

    assert!(requests < duration);
    assert!(duration < errors);
    assert!(errors < active);
}

#[test]
fn test_exposition_histogram_lines() {
    let registry = MetricsRegistry::new();
    let series = labels(&[("method", "GET"), ("path", "/x"), ("status", "200")]);
    registry.http_request_duration_seconds.observe(0.03, &series);

    let output = registry.to_exposition_text();

    // `le` comes first in bucket lines, series labels follow
    assert!(output.contains(
        "http_request_duration_seconds_bucket{le=\"0.05\",method=\"GET\",path=\"/x\",status=\"200\"} 1"
    ));
    assert!(output.contains(
        "http_request_duration_seconds_sum{method=\"GET\",path=\"/x\",status=\"200\"} 0.03"
    ));
    assert!(output.contains(
        "http_request_duration_seconds_count{method=\"GET\",path=\"/x\",status=\"200\"} 1"
    ));
}

#[test]
fn test_exposition_empty_labels_omit_braces() {
    let registry = MetricsRegistry::new();
    registry.http_active_requests.set(2.0, &LabelSet::empty());

    let output = registry.to_exposition_text();
    assert!(output.lines().any(|l| l == "http_active_requests 2"));
}

#[test]
fn test_exposition_has_no_trailing_newline() {
    let registry = MetricsRegistry::new();
    let output = registry.to_exposition_text();
    assert!(!output.ends_with('\n'));
}

// =============================================================================
// Request Tracker Tests
// =============================================================================

#[test]
fn test_track_request_success() {
    let registry = Arc::new(MetricsRegistry::new());
    let tracker = RequestTracker::new(registry.clone());

    tracker.track("GET", "/x", 200, 0.05);

    let series = labels(&[("method", "GET"), ("path", "/x"), ("status", "200")]);
    assert_eq!(registry.http_requests_total.value(&series), 1.0);
    assert_eq!(registry.http_errors_total.value(&series), 0.0);
    assert_eq!(
        registry.http_request_duration_seconds.summary(&series).count,
        1
    );
}

#[test]
fn test_track_request_server_error() {
    let registry = Arc::new(MetricsRegistry::new());
    let tracker = RequestTracker::new(registry.clone());

    tracker.track("GET", "/x", 500, 0.01);

    let series = labels(&[("method", "GET"), ("path", "/x"), ("status", "500")]);
    assert_eq!(registry.http_requests_total.value(&series), 1.0);
    assert_eq!(registry.http_errors_total.value(&series), 1.0);
}

#[test]
fn test_track_request_client_error() {
    let registry = Arc::new(MetricsRegistry::new());
    let tracker = RequestTracker::new(registry.clone());

    tracker.track("POST", "/notfound", 404, 0.005);

    let series = labels(&[("method", "POST"), ("path", "/notfound"), ("status", "404")]);
    assert_eq!(registry.http_errors_total.value(&series), 1.0);
}

#[test]
fn test_active_request_bracketing() {
    let registry = Arc::new(MetricsRegistry::new());
    let tracker = RequestTracker::new(registry.clone());

    tracker.request_started();
    tracker.request_started();
    assert_eq!(
        registry.http_active_requests.value(&LabelSet::empty()),
        2.0
    );

    tracker.request_finished();
    tracker.request_finished();
    assert_eq!(
        registry.http_active_requests.value(&LabelSet::empty()),
        0.0
    );
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_counter_increments_lose_no_updates() {
    const WORKERS: usize = 8;
    const INCREMENTS: usize = 2_000;

    let registry = Arc::new(MetricsRegistry::new());
    let series = labels(&[("method", "GET"), ("path", "/x"), ("status", "200")]);

    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let registry = registry.clone();
            let series = series.clone();
            std::thread::spawn(move || {
                for _ in 0..INCREMENTS {
                    registry.http_requests_total.inc(&series);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }

    assert_eq!(
        registry.http_requests_total.value(&series),
        (WORKERS * INCREMENTS) as f64
    );
}

#[test]
fn test_concurrent_histogram_observations() {
    const WORKERS: usize = 4;
    const OBSERVATIONS: usize = 1_000;

    let registry = Arc::new(MetricsRegistry::new());
    let series = labels(&[("path", "/x")]);

    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let registry = registry.clone();
            let series = series.clone();
            std::thread::spawn(move || {
                for _ in 0..OBSERVATIONS {
                    registry
                        .http_request_duration_seconds
                        .observe(0.01, &series);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let summary = registry.http_request_duration_seconds.summary(&series);
    assert_eq!(summary.count, (WORKERS * OBSERVATIONS) as u64);
    // Sum and bucket counts were updated atomically with count
    assert!((summary.sum - 0.01 * (WORKERS * OBSERVATIONS) as f64).abs() < 1e-6);
    let snapshot = registry.http_request_duration_seconds.snapshot();
    let bucket_count = snapshot[0]
        .buckets
        .iter()
        .find(|(b, _)| *b == 0.025)
        .map(|(_, c)| *c)
        .unwrap();
    assert_eq!(bucket_count, (WORKERS * OBSERVATIONS) as u64);
}
