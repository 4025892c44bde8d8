use super::error::{HandlerError, RpcError};
use super::protocol::{ErrorBody, ErrorCode, InitRequest, TYPE_ERROR, TYPE_INIT, TYPE_INIT_OK};
use super::registry::HandlerRegistry;
use super::types::{Body, Message, NodeId};

use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Identity and cluster view, fixed by the `init` message.
#[derive(Debug, Clone)]
pub struct Membership {
    pub id: NodeId,
    pub node_ids: Vec<NodeId>,
}

/// A protocol endpoint.
///
/// Outbound envelopes are pushed onto `outbound`; whichever wire owns the receiving
/// half delivers them. Inbound envelopes are fed to [`Node::dispatch`].
pub struct Node {
    membership: OnceLock<Membership>,
    next_msg_id: AtomicU64,
    pending: DashMap<u64, oneshot::Sender<Body>>,
    handlers: HandlerRegistry,
    outbound: mpsc::UnboundedSender<Message>,
}

impl Node {
    pub fn new(outbound: mpsc::UnboundedSender<Message>) -> Arc<Self> {
        Arc::new(Self {
            membership: OnceLock::new(),
            next_msg_id: AtomicU64::new(1),
            pending: DashMap::new(),
            handlers: HandlerRegistry::new(),
            outbound,
        })
    }

    /// Local node id, `None` until `init` has been received.
    pub fn id(&self) -> Option<NodeId> {
        self.membership.get().map(|m| m.id.clone())
    }

    /// Every node in the cluster, including this one.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.membership
            .get()
            .map(|m| m.node_ids.clone())
            .unwrap_or_default()
    }

    pub fn is_member(&self, id: &NodeId) -> bool {
        self.membership
            .get()
            .is_some_and(|m| m.node_ids.contains(id))
    }

    /// Routes inbound messages of type `kind` to `handler`.
    pub fn register<F, Fut>(&self, kind: &str, handler: F)
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Body, HandlerError>> + Send + 'static,
    {
        self.handlers.register(kind, handler);
    }

    fn next_msg_id(&self) -> u64 {
        self.next_msg_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Fire-and-forget send. Only fails if the wire has shut down.
    pub fn send(&self, dest: &NodeId, body: Body) -> Result<(), RpcError> {
        let msg = Message {
            src: self.id().unwrap_or_default(),
            dest: dest.clone(),
            body,
        };

        self.outbound.send(msg).map_err(|_| RpcError::Closed)
    }

    /// Sends `body` back to the sender of `request`, tagged with its `msg_id`.
    pub fn reply(&self, request: &Message, mut body: Body) -> Result<(), RpcError> {
        body.in_reply_to = request.body.msg_id;
        self.send(&request.src, body)
    }

    /// Sends a request and waits up to `timeout` for the matching reply.
    pub async fn rpc(&self, dest: &NodeId, mut body: Body, timeout: Duration) -> Result<Body, RpcError> {
        let msg_id = self.next_msg_id();
        body.msg_id = Some(msg_id);

        let (tx, rx) = oneshot::channel();
        self.pending.insert(msg_id, tx);

        if let Err(e) = self.send(dest, body) {
            self.pending.remove(&msg_id);
            return Err(e);
        }

        let reply = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => return Err(RpcError::Closed),
            Err(_) => {
                self.pending.remove(&msg_id);
                return Err(RpcError::Timeout(dest.clone()));
            }
        };

        if reply.kind == TYPE_ERROR {
            let err: ErrorBody = reply.payload().unwrap_or(ErrorBody {
                code: ErrorCode::Crash.as_u64(),
                text: "unparseable error body".to_string(),
            });
            return Err(RpcError::Remote {
                code: err.code,
                text: err.text,
            });
        }

        Ok(reply)
    }

    /// Runs `dispatch` in its own task.
    pub fn spawn_dispatch(self: &Arc<Self>, msg: Message) {
        let node = self.clone();
        tokio::spawn(async move {
            node.dispatch(msg).await;
        });
    }

    /// Handles one inbound envelope: completes a pending RPC, or runs the handler
    /// registered for the body type and replies with its outcome.
    pub async fn dispatch(self: Arc<Self>, msg: Message) {
        if let Some(in_reply_to) = msg.body.in_reply_to {
            match self.pending.remove(&in_reply_to) {
                Some((_, waiter)) => {
                    let _ = waiter.send(msg.body);
                }
                None => {
                    tracing::debug!(
                        "Dropping late reply {} from {} ({})",
                        in_reply_to,
                        msg.src,
                        msg.body.kind
                    );
                }
            }
            return;
        }

        let result = if msg.body.kind == TYPE_INIT {
            self.handle_init(&msg)
        } else {
            match self.handlers.get(&msg.body.kind) {
                Some(handler) => handler(msg.clone()).await,
                None => Err(HandlerError::NotSupported(msg.body.kind.clone())),
            }
        };

        let body = match result {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Request {} from {} failed: {}", msg.body.kind, msg.src, e);
                match Body::with_payload(
                    TYPE_ERROR,
                    &ErrorBody {
                        code: e.code().as_u64(),
                        text: e.to_string(),
                    },
                ) {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::error!("Failed to encode error reply: {}", e);
                        return;
                    }
                }
            }
        };

        if msg.body.msg_id.is_none() {
            return;
        }

        if let Err(e) = self.reply(&msg, body) {
            tracing::warn!("Failed to reply to {}: {}", msg.src, e);
        }
    }

    fn handle_init(&self, msg: &Message) -> Result<Body, HandlerError> {
        let req: InitRequest = msg.body.payload().map_err(HandlerError::malformed)?;

        let membership = Membership {
            id: req.node_id,
            node_ids: req.node_ids,
        };

        match self.membership.set(membership) {
            Ok(()) => {
                tracing::info!(
                    "Initialized as {} in a cluster of {} nodes",
                    self.id().unwrap_or_default(),
                    self.node_ids().len()
                );
            }
            Err(rejected) => {
                tracing::warn!("Ignoring repeated init as {}", rejected.id);
            }
        }

        Ok(Body::new(TYPE_INIT_OK))
    }
}

