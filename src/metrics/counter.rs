//! Monotonic counter instrument.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::errors::{Result, TaskhubError};

use super::labels::LabelSet;

/// A counter metric that only increases, partitioned by label set.
///
/// Series are created implicitly at zero on first observation. Negative
/// increments are rejected, never clamped: accepting them silently would
/// hide a caller bug behind a broken monotonicity invariant.
pub struct Counter {
    name: String,
    description: String,
    values: Mutex<HashMap<LabelSet, f64>>,
}

impl Counter {
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

    /// Increment the series for `labels` by 1.
    pub fn inc(&self, labels: &LabelSet) {
        let mut values = self.values.lock();
        *values.entry(labels.clone()).or_insert(0.0) += 1.0;
    }

    /// Increment the series for `labels` by `amount`.
    ///
    /// `amount` must be finite and non-negative; anything else is a contract
    /// violation and returns a `Validation` error without touching state.
    pub fn inc_by(&self, labels: &LabelSet, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(TaskhubError::validation(format!(
                "invalid increment {} for counter {}: counters cannot decrease",
                amount, self.name
            )));
        }
        let mut values = self.values.lock();
        *values.entry(labels.clone()).or_insert(0.0) += amount;
        Ok(())
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
