use super::outstanding::OutstandingTracker;
use super::store::ValueStore;
use super::topology::TopologyManager;
use super::types::Value;
use crate::node::types::NodeId;
use std::collections::HashMap;

/// Everything the broadcast engine mutates, owned in one place.
///
/// Invariants:
/// - every stored value is outstanding for every neighbor that has not acked it, except
///   the peer the value came from;
/// - neighbors are registered exactly once, when the topology resolves.
#[derive(Debug, Default)]
pub struct BroadcastState {
    pub store: ValueStore,
    pub topology: TopologyManager,
    pub outstanding: OutstandingTracker,
}

/// One gossip round to send: the neighbor and the snapshot of its outstanding values.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub neighbor: NodeId,
    pub values: Vec<Value>,
}

impl BroadcastState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the topology if it is not resolved yet. Returns `true` if this call
    /// resolved it.
    ///
    /// Newly registered neighbors start with every value already in the store, so
    /// values merged before resolution still propagate.
    pub fn resolve_topology(
        &mut self,
        local: &NodeId,
        provided: Option<&HashMap<NodeId, Vec<NodeId>>>,
        members: &[NodeId],
    ) -> bool {
        if self.topology.is_resolved() {
            return false;
        }

        let neighbors: Vec<NodeId> = self
            .topology
            .resolve(local, provided, members)
            .iter()
            .cloned()
            .collect();

        let known = self.store.snapshot();
        for neighbor in neighbors {
            if self.outstanding.register_neighbor(neighbor.clone()) {
                self.outstanding.extend(&neighbor, known.iter().cloned());
            }
        }

        true
    }

    /// Merges one value. Returns `false` (and changes nothing) if it was already known.
    pub fn merge(&mut self, value: Value, source: Option<&NodeId>) -> bool {
        if self.store.contains(&value) {
            return false;
        }

        self.outstanding.mark_outstanding(&value, source);
        self.store.insert(value)
    }

    /// Snapshot of every neighbor with something outstanding.
    pub fn plan_rounds(&self) -> Vec<Round> {
        self.outstanding
            .neighbors()
            .filter_map(|neighbor| {
                let values = self.outstanding.drain(neighbor);
                if values.is_empty() {
                    None
                } else {
                    Some(Round {
                        neighbor: neighbor.clone(),
                        values,
                    })
                }
            })
            .collect()
    }

    pub fn acknowledge(&mut self, neighbor: &NodeId, values: &[Value]) {
        self.outstanding.acknowledge(neighbor, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<NodeId> {
        raw.iter().map(|id| NodeId::from(*id)).collect()
    }

    fn resolved(local: &str, members: &[&str]) -> BroadcastState {
        let mut state = BroadcastState::new();
        state.resolve_topology(&NodeId::from(local), None, &ids(members));
        state
    }

    #[test]
    fn test_merge_marks_all_neighbors() {
        let mut state = resolved("n1", &["n1", "n2", "n3"]);

        assert!(state.merge(Value::Int(5), None));

        let rounds = state.plan_rounds();
        assert_eq!(rounds.len(), 2);
        assert!(rounds.iter().all(|r| r.values == vec![Value::Int(5)]));
    }

    #[test]
    fn test_duplicate_merge_is_noop() {
        let mut state = resolved("n1", &["n1", "n2"]);
        let n2 = NodeId::from("n2");

        assert!(state.merge(Value::Int(7), None));
        state.acknowledge(&n2, &[Value::Int(7)]);
        assert!(!state.merge(Value::Int(7), None));

        assert_eq!(state.store.snapshot(), vec![Value::Int(7)]);
        // a known value is not re-queued for gossip
        assert!(state.plan_rounds().is_empty());
    }

    #[test]
    fn test_merge_from_peer_is_not_echoed() {
        let mut state = resolved("n2", &["n1", "n2", "n3"]);

        state.merge(Value::Int(9), Some(&NodeId::from("n1")));

        let rounds = state.plan_rounds();
        assert_eq!(
            rounds,
            vec![Round {
                neighbor: NodeId::from("n3"),
                values: vec![Value::Int(9)],
            }]
        );
    }

    #[test]
    fn test_values_before_resolution_are_seeded() {
        let mut state = BroadcastState::new();
        state.merge(Value::Int(1), None);
        assert!(state.plan_rounds().is_empty());

        assert!(state.resolve_topology(&NodeId::from("n1"), None, &ids(&["n1", "n2"])));

        assert_eq!(state.outstanding.drain(&NodeId::from("n2")), vec![Value::Int(1)]);
    }

    #[test]
    fn test_second_resolution_is_ignored() {
        let mut state = resolved("n1", &["n1", "n2", "n3"]);
        let later = HashMap::from([(NodeId::from("n1"), ids(&["n2"]))]);

        assert!(!state.resolve_topology(&NodeId::from("n1"), Some(&later), &ids(&["n1", "n2", "n3"])));
        assert_eq!(state.topology.neighbors(), ids(&["n2", "n3"]));
    }

    #[test]
    fn test_ack_leaves_concurrent_broadcast_outstanding() {
        let mut state = resolved("n1", &["n1", "n2"]);
        let n2 = NodeId::from("n2");
        state.merge(Value::Int(1), None);

        let round = state.plan_rounds().remove(0);
        state.merge(Value::Int(2), None);
        state.acknowledge(&round.neighbor, &round.values);

        assert_eq!(state.outstanding.drain(&n2), vec![Value::Int(2)]);
    }
}
