//! Dissemination Loop
//!
//! Every tick, each neighbor with outstanding values gets one gossip round carrying
//! the full outstanding snapshot. A round that times out or fails leaves its values
//! outstanding; the next tick sends them again. There is no other retry path.

use super::protocol::{GossipRequest, TYPE_GOSSIP, TYPE_GOSSIP_OK};
use super::service::BroadcastService;
use super::state::Round;
use crate::node::error::RpcError;
use crate::node::types::Body;

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

impl BroadcastService {
    /// Spawns the periodic disseminator. It runs until the runtime shuts down.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        tracing::info!(
            "Starting disseminator (interval {:?}, ack timeout {:?})",
            self.gossip_interval,
            self.gossip_timeout
        );

        let service = self.clone();
        tokio::spawn(async move {
            service.gossip_loop().await;
        })
    }

    async fn gossip_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.gossip_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// Plans this tick's rounds under the lock, then launches them unlocked.
    pub async fn tick(self: &Arc<Self>) {
        let rounds = self.state.lock().await.plan_rounds();

        for round in rounds {
            let service = self.clone();
            tokio::spawn(async move {
                service.gossip_round(round).await;
            });
        }
    }

    async fn gossip_round(self: Arc<Self>, round: Round) {
        let Round { neighbor, values } = round;

        tracing::debug!("Gossiping {} values to {}", values.len(), neighbor);

        let request = GossipRequest {
            message: values.clone(),
        };
        let result = match Body::with_payload(TYPE_GOSSIP, &request) {
            Ok(body) => self.node.rpc(&neighbor, body, self.gossip_timeout).await,
            Err(e) => Err(RpcError::Encode(e)),
        };

        match result {
            Ok(reply) if reply.kind == TYPE_GOSSIP_OK => {
                self.state.lock().await.acknowledge(&neighbor, &values);
                tracing::debug!("{} acknowledged {} values", neighbor, values.len());
            }
            Ok(reply) => {
                tracing::warn!("Unexpected reply '{}' to gossip from {}", reply.kind, neighbor);
            }
            Err(e @ RpcError::Encode(_)) => {
                tracing::error!("Failed to encode gossip for {}: {}", neighbor, e);
            }
            Err(e) => {
                tracing::debug!(
                    "Gossip to {} failed ({}), {} values stay outstanding",
                    neighbor,
                    e,
                    values.len()
                );
            }
        }
    }
}
