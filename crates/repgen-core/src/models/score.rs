use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Decimal places used whenever a score is written into a document.
pub const SCORE_DECIMALS: usize = 3;

/// Named numeric analysis values for one patient, keyed by score name
/// (e.g. `CKD_score`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreSet {
    values: BTreeMap<String, f64>,
}

impl ScoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Merge another set into this one. Later values win on key collision.
    pub fn merge(&mut self, other: ScoreSet) {
        self.values.extend(other.values);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for ScoreSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
