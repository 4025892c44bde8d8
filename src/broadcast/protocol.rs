//! Broadcast Protocol
//!
//! Message types and request/response bodies exposed by the broadcast service.
//!
//! | type        | fields in                          | reply                           |
//! |-------------|------------------------------------|---------------------------------|
//! | `broadcast` | `message: Value`                   | `broadcast_ok`                  |
//! | `read`      | -                                  | `read_ok`, `messages: [Value]`  |
//! | `topology`  | `topology: {node-id: [node-id]}`   | `topology_ok`                   |
//! | `gossip`    | `message: [Value]`                 | `gossip_ok`                     |

use super::types::Value;
use serde::{Deserialize, Serialize};

// --- Message Types ---

pub const TYPE_BROADCAST: &str = "broadcast";
pub const TYPE_BROADCAST_OK: &str = "broadcast_ok";
pub const TYPE_READ: &str = "read";
pub const TYPE_READ_OK: &str = "read_ok";
pub const TYPE_TOPOLOGY: &str = "topology";
pub const TYPE_TOPOLOGY_OK: &str = "topology_ok";
pub const TYPE_GOSSIP: &str = "gossip";
pub const TYPE_GOSSIP_OK: &str = "gossip_ok";

// --- Data Transfer Objects ---

/// A value submitted by a client, or forwarded by a peer.
#[derive(Debug, Serialize, Deserialize)]
pub struct BroadcastRequest {
    pub message: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadResponse {
    pub messages: Vec<Value>,
}

/// The topology field is kept raw: a payload that does not decode into a
/// neighbor map falls back to full membership instead of failing the request.
#[derive(Debug, Serialize, Deserialize)]
pub struct TopologyRequest {
    #[serde(default)]
    pub topology: Option<serde_json::Value>,
}

/// A batch of outstanding values pushed to one neighbor.
#[derive(Debug, Serialize, Deserialize)]
pub struct GossipRequest {
    pub message: Vec<Value>,
}
