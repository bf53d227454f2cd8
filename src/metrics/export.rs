//! Metric serialization: Prometheus text exposition and the JSON document.
//!
//! Instruments are rendered in registration order. Series within an
//! instrument are sorted by label set so output is deterministic even
//! though the underlying maps are unordered.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use super::counter::Counter;
use super::gauge::Gauge;
use super::histogram::Histogram;
use super::labels::LabelSet;
use super::registry::MetricsRegistry;

/// JSON export document served at `/metrics/json`.
#[derive(Serialize)]
pub struct MetricsReport {
    pub uptime_seconds: f64,
    pub metrics: MetricsSection,
}

/// The fixed instrument set, keyed by metric name in registration order.
#[derive(Serialize)]
pub struct MetricsSection {
    #[serde(rename = "http_requests_total")]
    pub requests: MetricExport,
    #[serde(rename = "http_request_duration_seconds")]
    pub request_duration: MetricExport,
    #[serde(rename = "http_errors_total")]
    pub errors: MetricExport,
    #[serde(rename = "http_active_requests")]
    pub active_requests: MetricExport,
}

#[derive(Serialize)]
pub struct MetricExport {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub metric_type: &'static str,
    pub values: Vec<SeriesExport>,
}

/// One exported series: a plain sample for counters/gauges, a distribution
/// for histograms.
#[derive(Serialize)]
#[serde(untagged)]
pub enum SeriesExport {
    Sample {
        labels: LabelSet,
        value: f64,
    },
    Distribution {
        labels: LabelSet,
        count: u64,
        sum: f64,
        buckets: BucketCounts,
    },
}

/// Cumulative bucket counts serialized as a `{"<boundary>": count}` object
/// in ascending boundary order.
pub struct BucketCounts(Vec<(f64, u64)>);

impl Serialize for BucketCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (boundary, count) in &self.0 {
            map.serialize_entry(&fmt_value(*boundary), count)?;
        }
        map.end()
    }
}

pub(crate) fn collect_all(registry: &MetricsRegistry) -> MetricsReport {
    MetricsReport {
        uptime_seconds: registry.uptime(),
        metrics: MetricsSection {
            requests: export_counter(&registry.http_requests_total),
            request_duration: export_histogram(&registry.http_request_duration_seconds),
            errors: export_counter(&registry.http_errors_total),
            active_requests: export_gauge(&registry.http_active_requests),
        },
    }
}

fn export_counter(counter: &Counter) -> MetricExport {
    let mut snapshot = counter.snapshot();
    snapshot.sort_by(|a, b| a.0.cmp(&b.0));
    MetricExport {
        name: counter.name().to_string(),
        description: counter.description().to_string(),
        metric_type: "counter",
        values: snapshot
            .into_iter()
            .map(|(labels, value)| SeriesExport::Sample { labels, value })
            .collect(),
    }
}

fn export_gauge(gauge: &Gauge) -> MetricExport {
    let mut snapshot = gauge.snapshot();
    snapshot.sort_by(|a, b| a.0.cmp(&b.0));
    MetricExport {
        name: gauge.name().to_string(),
        description: gauge.description().to_string(),
        metric_type: "gauge",
        values: snapshot
            .into_iter()
            .map(|(labels, value)| SeriesExport::Sample { labels, value })
            .collect(),
    }
}

fn export_histogram(histogram: &Histogram) -> MetricExport {
    let mut snapshot = histogram.snapshot();
    snapshot.sort_by(|a, b| a.labels.cmp(&b.labels));
    MetricExport {
        name: histogram.name().to_string(),
        description: histogram.description().to_string(),
        metric_type: "histogram",
        values: snapshot
            .into_iter()
            .map(|series| SeriesExport::Distribution {
                labels: series.labels,
                count: series.count,
                sum: series.sum,
                buckets: BucketCounts(series.buckets),
            })
            .collect(),
    }
}

// ============================================================
// Prometheus text exposition
// ============================================================

pub(crate) fn render_exposition(registry: &MetricsRegistry) -> String {
    let mut lines: Vec<String> = Vec::new();

    render_counter(&mut lines, &registry.http_requests_total);
    render_histogram(&mut lines, &registry.http_request_duration_seconds);
    render_counter(&mut lines, &registry.http_errors_total);
    render_gauge(&mut lines, &registry.http_active_requests);

    lines.join("\n")
}

fn render_counter(lines: &mut Vec<String>, counter: &Counter) {
    lines.push(format!("# HELP {} {}", counter.name(), counter.description()));
    lines.push(format!("# TYPE {} counter", counter.name()));

    let mut snapshot = counter.snapshot();
    snapshot.sort_by(|a, b| a.0.cmp(&b.0));
    for (labels, value) in snapshot {
        lines.push(format!(
            "{}{} {}",
            counter.name(),
            label_part(&labels),
            fmt_value(value)
        ));
    }
}

fn render_gauge(lines: &mut Vec<String>, gauge: &Gauge) {
    lines.push(format!("# HELP {} {}", gauge.name(), gauge.description()));
    lines.push(format!("# TYPE {} gauge", gauge.name()));

    let mut snapshot = gauge.snapshot();
    snapshot.sort_by(|a, b| a.0.cmp(&b.0));
    for (labels, value) in snapshot {
        lines.push(format!(
            "{}{} {}",
            gauge.name(),
            label_part(&labels),
            fmt_value(value)
        ));
    }
}

fn render_histogram(lines: &mut Vec<String>, histogram: &Histogram) {
    lines.push(format!(
        "# HELP {} {}",
        histogram.name(),
        histogram.description()
    ));
    lines.push(format!("# TYPE {} histogram", histogram.name()));

    let mut snapshot = histogram.snapshot();
    snapshot.sort_by(|a, b| a.labels.cmp(&b.labels));
    for series in snapshot {
        let labels = label_body(&series.labels);
        // `le` comes first in bucket lines, the series labels follow.
        let suffix = if labels.is_empty() {
            String::new()
        } else {
            format!(",{}", labels)
        };
        for (boundary, count) in &series.buckets {
            lines.push(format!(
                "{}_bucket{{le=\"{}\"{}}} {}",
                histogram.name(),
                fmt_value(*boundary),
                suffix,
                count
            ));
        }
        lines.push(format!(
            "{}_sum{} {}",
            histogram.name(),
            label_part(&series.labels),
            fmt_value(series.sum)
        ));
        lines.push(format!(
            "{}_count{} {}",
            histogram.name(),
            label_part(&series.labels),
            series.count
        ));
    }
}

/// `k1="v1",k2="v2"` without braces; empty string for the empty set.
fn label_body(labels: &LabelSet) -> String {
    labels
        .iter()
        .map(|(name, value)| format!("{}=\"{}\"", name, escape_label(value)))
        .collect::<Vec<_>>()
        .join(",")
}

/// `{k1="v1",...}`, or the empty string for the empty label set.
fn label_part(labels: &LabelSet) -> String {
    if labels.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", label_body(labels))
    }
}

/// Escape a label value for exposition output.
fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn fmt_value(value: f64) -> String {
    format!("{}", value)
}
