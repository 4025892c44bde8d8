use super::types::Value;
use crate::node::types::NodeId;
use std::collections::{BTreeMap, BTreeSet};

/// Per-neighbor set of values the neighbor has not acknowledged.
#[derive(Debug, Default)]
pub struct OutstandingTracker {
    pending: BTreeMap<NodeId, BTreeSet<Value>>,
}

impl OutstandingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the neighbor was not registered before.
    pub fn register_neighbor(&mut self, id: NodeId) -> bool {
        if self.pending.contains_key(&id) {
            return false;
        }
        self.pending.insert(id, BTreeSet::new());
        true
    }

    /// Registered neighbors in id order.
    pub fn neighbors(&self) -> impl Iterator<Item = &NodeId> {
        self.pending.keys()
    }

    /// Marks `value` outstanding for every registered neighbor except `exclude`.
    pub fn mark_outstanding(&mut self, value: &Value, exclude: Option<&NodeId>) {
        for (neighbor, values) in self.pending.iter_mut() {
            if Some(neighbor) == exclude {
                continue;
            }
            values.insert(value.clone());
        }
    }

    /// Marks `values` outstanding for a single registered neighbor.
    pub fn extend(&mut self, neighbor: &NodeId, values: impl IntoIterator<Item = Value>) {
        if let Some(pending) = self.pending.get_mut(neighbor) {
            pending.extend(values);
        }
    }

    /// Snapshot of what `neighbor` still lacks. Nothing is cleared until
    /// [`OutstandingTracker::acknowledge`].
    pub fn drain(&self, neighbor: &NodeId) -> Vec<Value> {
        self.pending
            .get(neighbor)
            .map(|values| values.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Clears exactly `values`. Anything marked after the matching `drain` survives.
    pub fn acknowledge(&mut self, neighbor: &NodeId, values: &[Value]) {
        if let Some(pending) = self.pending.get_mut(neighbor) {
            for value in values {
                pending.remove(value);
            }
        }
    }
}
