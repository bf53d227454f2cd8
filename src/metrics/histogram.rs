//! Cumulative histogram instrument.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::labels::LabelSet;

/// Default latency buckets in seconds.
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Per-series state. All three fields are updated together under the
/// histogram lock so readers never see a partial observation.
struct Series {
    sum: f64,
    count: u64,
    /// Cumulative counts, parallel to the boundary vector.
    buckets: Vec<u64>,
}

impl Series {
    fn new(bucket_count: usize) -> Self {
        Self {
            sum: 0.0,
            count: 0,
            buckets: vec![0; bucket_count],
        }
    }
}

/// Summary statistics for one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSummary {
    pub count: u64,
    pub sum: f64,
    pub average: f64,
}

/// Point-in-time snapshot of one series.
pub struct HistogramSnapshot {
    pub labels: LabelSet,
    pub count: u64,
    pub sum: f64,
    /// `(boundary, cumulative count)` in ascending boundary order.
    pub buckets: Vec<(f64, u64)>,
}

/// A distribution metric with fixed, ascending bucket boundaries.
///
/// Buckets are cumulative: every boundary `b >= value` is incremented per
/// observation. Values above the largest boundary still count toward
/// sum/count, matching the implicit `+Inf` bucket convention. Boundaries are
/// fixed at construction; observation cost stays O(buckets) and no raw
/// samples are retained.
pub struct Histogram {
    name: String,
    description: String,
    boundaries: Vec<f64>,
    series: Mutex<HashMap<LabelSet, Series>>,
}

impl Histogram {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_buckets(name, description, &DEFAULT_BUCKETS)
    }

    /// Create a histogram with explicit boundaries. Boundaries are sorted and
    /// deduplicated so the cumulative invariant holds for any input order.
    pub fn with_buckets(
        name: impl Into<String>,
        description: impl Into<String>,
        boundaries: &[f64],
    ) -> Self {
        let mut boundaries = boundaries.to_vec();
        boundaries.sort_by(|a, b| a.total_cmp(b));
        boundaries.dedup();
        Self {
            name: name.into(),
            description: description.into(),
            boundaries,
            series: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Record one observation for `labels`.
    pub fn observe(&self, value: f64, labels: &LabelSet) {
        let mut series = self.series.lock();
        let entry = series
            .entry(labels.clone())
            .or_insert_with(|| Series::new(self.boundaries.len()));

        entry.sum += value;
        entry.count += 1;
        for (i, boundary) in self.boundaries.iter().enumerate() {
            if value <= *boundary {
                entry.buckets[i] += 1;
            }
        }
    }

    /// Count, sum, and average for `labels`; all zero if never observed.
    pub fn summary(&self, labels: &LabelSet) -> HistogramSummary {
        let series = self.series.lock();
        match series.get(labels) {
            Some(entry) => HistogramSummary {
                count: entry.count,
                sum: entry.sum,
                average: if entry.count > 0 {
                    entry.sum / entry.count as f64
                } else {
                    0.0
                },
            },
            None => HistogramSummary {
                count: 0,
                sum: 0.0,
                average: 0.0,
            },
        }
    }

    /// One snapshot per observed series, in no particular order.
    pub fn snapshot(&self) -> Vec<HistogramSnapshot> {
        let series = self.series.lock();
        series
            .iter()
            .map(|(labels, entry)| HistogramSnapshot {
                labels: labels.clone(),
                count: entry.count,
                sum: entry.sum,
                buckets: self
                    .boundaries
                    .iter()
                    .copied()
                    .zip(entry.buckets.iter().copied())
                    .collect(),
            })
            .collect()
    }
}
