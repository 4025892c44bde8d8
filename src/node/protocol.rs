//! Node Protocol
//!
//! Message types handled by the runtime itself and the error vocabulary shared by
//! every service.

use super::types::NodeId;
use serde::{Deserialize, Serialize};

// --- Message Types ---

pub const TYPE_INIT: &str = "init";
pub const TYPE_INIT_OK: &str = "init_ok";
pub const TYPE_ERROR: &str = "error";

// --- Error Codes ---

/// Standard Maelstrom error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotSupported = 10,
    MalformedRequest = 12,
    Crash = 13,
}

impl ErrorCode {
    pub fn as_u64(self) -> u64 {
        self as u64
    }
}

// --- Data Transfer Objects ---

/// Sent once by the workbench before any other message.
#[derive(Debug, Serialize, Deserialize)]
pub struct InitRequest {
    pub node_id: NodeId,
    pub node_ids: Vec<NodeId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u64,
    #[serde(default)]
    pub text: String,
}
