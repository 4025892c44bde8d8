//! In-Memory Network
//!
//! Routes envelopes between nodes living in the same process. Directed links can be
//! cut and restored at runtime, and every envelope put on a link is recorded, so
//! cluster behaviour under message loss can be exercised without sockets.
//! Test builds only: the traffic log is never pruned.

use super::error::RpcError;
use super::protocol::TYPE_INIT;
use super::service::Node;
use super::types::{Body, Message, NodeId};

use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

pub struct Network {
    nodes: DashMap<NodeId, Arc<Node>>,
    clients: DashMap<NodeId, mpsc::UnboundedSender<Message>>,
    blocked: DashSet<(NodeId, NodeId)>,
    traffic: DashMap<(NodeId, NodeId), Vec<Body>>,
}

impl Network {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            nodes: DashMap::new(),
            clients: DashMap::new(),
            blocked: DashSet::new(),
            traffic: DashMap::new(),
        })
    }

    /// Creates a node attached to this network. It still needs `init` (see [`Network::init_all`]).
    pub fn add_node(self: &Arc<Self>, id: &str) -> Arc<Node> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let node = Node::new(tx);
        self.nodes.insert(NodeId::from(id), node.clone());

        let network = self.clone();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                network.route(msg);
            }
        });

        node
    }

    pub fn add_client(self: &Arc<Self>, id: &str) -> Client {
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.insert(NodeId::from(id), tx);

        Client {
            id: NodeId::from(id),
            network: self.clone(),
            inbox: Mutex::new(rx),
            next_msg_id: AtomicU64::new(1),
        }
    }

    /// Delivers `init` to every node, announcing the full member list.
    pub async fn init_all(&self) {
        let mut node_ids: Vec<NodeId> = self.nodes.iter().map(|e| e.key().clone()).collect();
        node_ids.sort();

        for id in &node_ids {
            let Some(node) = self.nodes.get(id).map(|e| e.value().clone()) else {
                continue;
            };

            let mut body = Body::new(TYPE_INIT);
            body.msg_id = Some(1);
            body.fields.insert("node_id".to_string(), serde_json::json!(id));
            body.fields.insert("node_ids".to_string(), serde_json::json!(node_ids));

            node.dispatch(Message {
                src: NodeId::from("init"),
                dest: id.clone(),
                body,
            })
            .await;
        }
    }

    /// Drops everything sent from `from` to `to` until [`Network::heal`] is called.
    pub fn cut(&self, from: &str, to: &str) {
        self.blocked.insert((NodeId::from(from), NodeId::from(to)));
    }

    pub fn heal(&self, from: &str, to: &str) {
        self.blocked.remove(&(NodeId::from(from), NodeId::from(to)));
    }

    /// Every body put on the `from -> to` link so far, delivered or not.
    pub fn traffic(&self, from: &str, to: &str) -> Vec<Body> {
        self.traffic
            .get(&(NodeId::from(from), NodeId::from(to)))
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }

    /// Number of messages of type `kind` put on the `from -> to` link.
    pub fn count(&self, from: &str, to: &str, kind: &str) -> usize {
        self.traffic(from, to)
            .iter()
            .filter(|body| body.kind == kind)
            .count()
    }

    fn route(&self, msg: Message) {
        let link = (msg.src.clone(), msg.dest.clone());
        self.traffic
            .entry(link.clone())
            .or_default()
            .push(msg.body.clone());

        if self.blocked.contains(&link) {
            tracing::debug!("Dropped {} on cut link {} -> {}", msg.body.kind, link.0, link.1);
            return;
        }

        if let Some(node) = self.nodes.get(&msg.dest).map(|e| e.value().clone()) {
            node.spawn_dispatch(msg);
        } else if let Some(client) = self.clients.get(&msg.dest) {
            let _ = client.send(msg);
        } else {
            tracing::debug!("Dropped {} for unknown destination {}", msg.body.kind, msg.dest);
        }
    }
}

/// A request/response endpoint that is not a cluster node, standing in for the
/// workbench clients.
pub struct Client {
    id: NodeId,
    network: Arc<Network>,
    inbox: Mutex<mpsc::UnboundedReceiver<Message>>,
    next_msg_id: AtomicU64,
}

impl Client {
    /// Sends `body` to `dest` and waits for its reply. Error replies are returned
    /// as-is so callers can inspect the code.
    pub async fn call(&self, dest: &str, mut body: Body, timeout: Duration) -> Result<Body, RpcError> {
        let msg_id = self.next_msg_id.fetch_add(1, Ordering::Relaxed);
        body.msg_id = Some(msg_id);

        self.network.route(Message {
            src: self.id.clone(),
            dest: NodeId::from(dest),
            body,
        });

        let mut inbox = self.inbox.lock().await;
        let wait = async {
            while let Some(msg) = inbox.recv().await {
                if msg.body.in_reply_to == Some(msg_id) {
                    return Some(msg.body);
                }
            }
            None
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(RpcError::Closed),
            Err(_) => Err(RpcError::Timeout(NodeId::from(dest))),
        }
    }
}
