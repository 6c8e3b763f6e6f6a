use crate::value::ScalarValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Scope holding module-less scalars (`scalar . delay-average ...`).
pub const TOP_LEVEL_SCOPE: &str = ".";
/// Reserved scope collecting every `field` line.
pub const STATISTICS_SCOPE: &str = "statistics";

/// Everything extracted from one trace file, keyed by scope then metric name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawRecordStore {
    scopes: BTreeMap<String, BTreeMap<String, ScalarValue>>,
}

impl RawRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value; a later insert for the same scope and name replaces the earlier one.
    pub fn insert(&mut self, scope: &str, name: &str, value: ScalarValue) {
        self.scopes
            .entry(scope.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    pub fn get(&self, scope: &str, name: &str) -> Option<&ScalarValue> {
        self.scopes.get(scope).and_then(|metrics| metrics.get(name))
    }

    /// Numeric value at `scope`/`name`, `None` when absent or textual.
    pub fn number(&self, scope: &str, name: &str) -> Option<f64> {
        self.get(scope, name).and_then(ScalarValue::as_f64)
    }

    pub fn scope(&self, scope: &str) -> Option<&BTreeMap<String, ScalarValue>> {
        self.scopes.get(scope)
    }

    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    /// Total number of stored values across all scopes.
    pub fn len(&self) -> usize {
        self.scopes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
