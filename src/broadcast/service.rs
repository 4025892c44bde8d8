use super::handlers;
use super::protocol::{TYPE_BROADCAST, TYPE_GOSSIP, TYPE_READ, TYPE_TOPOLOGY};
use super::state::BroadcastState;
use super::types::Value;
use crate::config::Config;
use crate::node::service::Node;
use crate::node::types::NodeId;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// The broadcast engine of one node.
///
/// All request handlers and the disseminator share this instance. The state lock is
/// only ever held for in-memory work.
pub struct BroadcastService {
    pub(super) node: Arc<Node>,
    pub(super) state: Mutex<BroadcastState>,
    pub(super) gossip_interval: Duration,
    pub(super) gossip_timeout: Duration,
}

impl BroadcastService {
    pub fn new(node: Arc<Node>, config: &Config) -> Arc<Self> {
        Arc::new(Self {
            node,
            state: Mutex::new(BroadcastState::new()),
            gossip_interval: config.gossip_interval(),
            gossip_timeout: config.gossip_timeout(),
        })
    }

    /// Registers the `broadcast`, `read`, `topology` and `gossip` handlers on the node.
    pub fn register_handlers(self: &Arc<Self>) {
        let service = self.clone();
        self.node.register(TYPE_BROADCAST, move |msg| {
            handlers::handle_broadcast(service.clone(), msg)
        });

        let service = self.clone();
        self.node
            .register(TYPE_READ, move |msg| handlers::handle_read(service.clone(), msg));

        let service = self.clone();
        self.node.register(TYPE_TOPOLOGY, move |msg| {
            handlers::handle_topology(service.clone(), msg)
        });

        let service = self.clone();
        self.node
            .register(TYPE_GOSSIP, move |msg| handlers::handle_gossip(service.clone(), msg));
    }

    /// `Some(src)` if `src` is a cluster member (a peer forwarding a value), `None` for
    /// clients.
    pub fn peer_source(&self, src: &NodeId) -> Option<NodeId> {
        if self.node.is_member(src) && self.node.id().as_ref() != Some(src) {
            Some(src.clone())
        } else {
            None
        }
    }

    fn ensure_topology(&self, state: &mut BroadcastState) {
        if state.topology.is_resolved() {
            return;
        }
        let Some(local) = self.node.id() else {
            return;
        };

        if state.resolve_topology(&local, None, &self.node.node_ids()) {
            tracing::info!(
                "No topology received, gossiping to all members: {:?}",
                state.topology.neighbors()
            );
        }
    }

    /// Records a value submitted by a client (`source == None`) or forwarded by a peer.
    /// Returns `true` if the value was new.
    pub async fn broadcast(&self, source: Option<&NodeId>, value: Value) -> bool {
        let mut state = self.state.lock().await;
        self.ensure_topology(&mut state);

        let added = state.merge(value.clone(), source);
        if added {
            tracing::debug!("Accepted {} (from {:?})", value, source);
        } else {
            tracing::debug!("Ignoring known value {}", value);
        }
        added
    }

    /// Merges a batch pushed by `source`. Returns how many values were new.
    pub async fn gossip(&self, source: &NodeId, values: Vec<Value>) -> usize {
        let mut state = self.state.lock().await;
        self.ensure_topology(&mut state);

        let total = values.len();
        let added = values
            .into_iter()
            .filter(|value| state.merge(value.clone(), Some(source)))
            .count();

        tracing::debug!("Merged gossip from {}: {} of {} new", source, added, total);
        added
    }

    /// Everything this node knows. Never waits on the network.
    pub async fn read(&self) -> Vec<Value> {
        self.state.lock().await.store.snapshot()
    }

    /// Applies a `topology` message. Only the first resolution counts.
    pub async fn set_topology(&self, provided: Option<HashMap<NodeId, Vec<NodeId>>>) {
        let Some(local) = self.node.id() else {
            tracing::warn!("Ignoring topology received before init");
            return;
        };

        let mut state = self.state.lock().await;
        if state.resolve_topology(&local, provided.as_ref(), &self.node.node_ids()) {
            tracing::info!("Topology resolved, neighbors: {:?}", state.topology.neighbors());
        } else {
            tracing::debug!("Topology already resolved, ignoring update");
        }
    }

    /// Resolved neighbors, empty until topology is resolved.
    pub async fn neighbors(&self) -> Vec<NodeId> {
        self.state.lock().await.topology.neighbors()
    }

    /// Values `neighbor` has not acknowledged yet.
    pub async fn outstanding(&self, neighbor: &NodeId) -> Vec<Value> {
        self.state.lock().await.outstanding.drain(neighbor)
    }
}
