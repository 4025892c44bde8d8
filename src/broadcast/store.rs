use super::types::Value;
use std::collections::BTreeSet;

/// Grow-only set of every value this node has observed.
#[derive(Debug, Default)]
pub struct ValueStore {
    values: BTreeSet<Value>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.values.contains(value)
    }

    /// Returns `false` if the value was already known.
    pub fn insert(&mut self, value: Value) -> bool {
        self.values.insert(value)
    }

    /// All known values in ascending order.
    pub fn snapshot(&self) -> Vec<Value> {
        self.values.iter().cloned().collect()
    }
}
