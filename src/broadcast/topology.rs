use crate::node::types::NodeId;
use std::collections::{BTreeSet, HashMap};

/// This node's neighbor set. Written once, on first use.
#[derive(Debug, Default)]
pub struct TopologyManager {
    neighbors: Option<BTreeSet<NodeId>>,
}

impl TopologyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.neighbors.is_some()
    }

    /// Resolves the neighbor set, or returns the cached one.
    ///
    /// If `provided` has a row for `local`, that row is used as given; otherwise the
    /// neighbors are every member except `local`. Later calls ignore their arguments.
    pub fn resolve(
        &mut self,
        local: &NodeId,
        provided: Option<&HashMap<NodeId, Vec<NodeId>>>,
        members: &[NodeId],
    ) -> &BTreeSet<NodeId> {
        self.neighbors.get_or_insert_with(|| {
            match provided.and_then(|topology| topology.get(local)) {
                Some(row) => row.iter().cloned().collect(),
                None => members.iter().filter(|id| *id != local).cloned().collect(),
            }
        })
    }

    pub fn neighbors(&self) -> Vec<NodeId> {
        self.neighbors
            .as_ref()
            .map(|n| n.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<NodeId> {
        raw.iter().map(|id| NodeId::from(*id)).collect()
    }

    #[test]
    fn test_provided_row_is_used() {
        let mut topology = TopologyManager::new();
        let provided = HashMap::from([
            (NodeId::from("n1"), ids(&["n2"])),
            (NodeId::from("n2"), ids(&["n1", "n3"])),
        ]);

        let neighbors = topology.resolve(&NodeId::from("n1"), Some(&provided), &ids(&["n1", "n2", "n3"]));

        assert_eq!(neighbors.len(), 1);
        assert!(neighbors.contains(&NodeId::from("n2")));
    }

    #[test]
    fn test_missing_row_falls_back_to_members() {
        let mut topology = TopologyManager::new();
        let provided = HashMap::from([(NodeId::from("n2"), ids(&["n1"]))]);

        topology.resolve(&NodeId::from("n1"), Some(&provided), &ids(&["n1", "n2", "n3"]));

        assert_eq!(topology.neighbors(), ids(&["n2", "n3"]));
    }

    #[test]
    fn test_first_resolution_wins() {
        let mut topology = TopologyManager::new();
        assert!(!topology.is_resolved());

        topology.resolve(&NodeId::from("n1"), None, &ids(&["n1", "n2", "n3"]));
        let later = HashMap::from([(NodeId::from("n1"), ids(&["n3"]))]);
        topology.resolve(&NodeId::from("n1"), Some(&later), &ids(&["n1", "n2", "n3"]));

        assert!(topology.is_resolved());
        assert_eq!(topology.neighbors(), ids(&["n2", "n3"]));
    }

    #[test]
    fn test_unresolved_has_no_neighbors() {
        assert!(TopologyManager::new().neighbors().is_empty());
    }
}
