//! Up/down gauge instrument.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::labels::LabelSet;

/// A gauge metric that can go up and down, partitioned by label set.
///
/// No monotonicity constraint; values may be negative.
pub struct Gauge {
    name: String,
    description: String,
    values: Mutex<HashMap<LabelSet, f64>>,
}

impl Gauge {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            values: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the series for `labels` to an absolute value.
    pub fn set(&self, value: f64, labels: &LabelSet) {
        let mut values = self.values.lock();
        values.insert(labels.clone(), value);
    }

    /// Increment the series for `labels` by 1.
    pub fn inc(&self, labels: &LabelSet) {
        self.inc_by(labels, 1.0);
    }

    pub fn inc_by(&self, labels: &LabelSet, amount: f64) {
        let mut values = self.values.lock();
        *values.entry(labels.clone()).or_insert(0.0) += amount;
    }

    /// Decrement the series for `labels` by 1.
    pub fn dec(&self, labels: &LabelSet) {
        self.dec_by(labels, 1.0);
    }

    pub fn dec_by(&self, labels: &LabelSet, amount: f64) {
        let mut values = self.values.lock();
        *values.entry(labels.clone()).or_insert(0.0) -= amount;
    }

    /// Current value for `labels`, 0.0 if the series was never observed.
    pub fn value(&self, labels: &LabelSet) -> f64 {
        self.values.lock().get(labels).copied().unwrap_or(0.0)
    }

    /// One `(labels, value)` entry per observed series, in no particular order.
    pub fn snapshot(&self) -> Vec<(LabelSet, f64)> {
        self.values
            .lock()
            .iter()
            .map(|(labels, value)| (labels.clone(), *value))
            .collect()
    }
}
