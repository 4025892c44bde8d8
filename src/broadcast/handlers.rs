use super::protocol::{
    BroadcastRequest, GossipRequest, ReadResponse, TopologyRequest, TYPE_BROADCAST_OK,
    TYPE_GOSSIP_OK, TYPE_READ_OK, TYPE_TOPOLOGY_OK,
};
use super::service::BroadcastService;
use crate::node::error::HandlerError;
use crate::node::types::{Body, Message, NodeId};

use std::collections::HashMap;
use std::sync::Arc;

pub async fn handle_broadcast(
    service: Arc<BroadcastService>,
    msg: Message,
) -> Result<Body, HandlerError> {
    let req: BroadcastRequest = msg.body.payload().map_err(HandlerError::malformed)?;

    let source = service.peer_source(&msg.src);
    service.broadcast(source.as_ref(), req.message).await;

    // known values are acked too: the caller only needs to know we have it
    Ok(Body::new(TYPE_BROADCAST_OK))
}

pub async fn handle_read(service: Arc<BroadcastService>, _msg: Message) -> Result<Body, HandlerError> {
    let messages = service.read().await;

    Body::with_payload(TYPE_READ_OK, &ReadResponse { messages }).map_err(HandlerError::Encode)
}

pub async fn handle_topology(
    service: Arc<BroadcastService>,
    msg: Message,
) -> Result<Body, HandlerError> {
    let req: TopologyRequest = msg.body.payload().unwrap_or(TopologyRequest { topology: None });

    let provided = req.topology.and_then(|raw| {
        match serde_json::from_value::<HashMap<NodeId, Vec<NodeId>>>(raw) {
            Ok(topology) => Some(topology),
            Err(e) => {
                tracing::warn!("Malformed topology from {} ({}), using full membership", msg.src, e);
                None
            }
        }
    });

    service.set_topology(provided).await;

    Ok(Body::new(TYPE_TOPOLOGY_OK))
}

pub async fn handle_gossip(service: Arc<BroadcastService>, msg: Message) -> Result<Body, HandlerError> {
    let req: GossipRequest = msg.body.payload().map_err(HandlerError::malformed)?;

    service.gossip(&msg.src, req.message).await;

    Ok(Body::new(TYPE_GOSSIP_OK))
}
