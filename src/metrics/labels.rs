//! Canonical label-set keys for metric series.
//!
//! A label set is an unordered mapping of label names to values. Two sets
//! with the same name/value pairs must address the same series regardless of
//! insertion order, so pairs are stored sorted by name.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// An immutable, order-independent set of `name=value` label pairs.
///
/// Construction canonicalizes the pairs (sorted by name, duplicate names
/// collapse to the last value given). Used only as a lookup key; never
/// mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelSet(Vec<(String, String)>);

impl LabelSet {
    /// The empty label set (metrics without labels).
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a canonical label set from name/value pairs, in any order.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate pairs in canonical (name-sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }
}

impl FromIterator<(String, String)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        // BTreeMap gives name ordering and last-value-wins for duplicates.
        let map: BTreeMap<String, String> = iter.into_iter().collect();
        Self(map.into_iter().collect())
    }
}

impl Serialize for LabelSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
