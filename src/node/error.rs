use super::protocol::ErrorCode;
use super::types::NodeId;

/// Failure of an outbound request.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("request to {0} timed out")]
    Timeout(NodeId),

    #[error("remote error {code}: {text}")]
    Remote { code: u64, text: String },

    #[error("outbound wire closed")]
    Closed,

    #[error("failed to encode request: {0}")]
    Encode(serde_json::Error),
}

/// Failure of an inbound request, reported back to the caller as an `error` body.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("unsupported message type '{0}'")]
    NotSupported(String),

    #[error("failed to encode reply: {0}")]
    Encode(serde_json::Error),
}

impl HandlerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HandlerError::Malformed(_) => ErrorCode::MalformedRequest,
            HandlerError::NotSupported(_) => ErrorCode::NotSupported,
            HandlerError::Encode(_) => ErrorCode::Crash,
        }
    }

    pub fn malformed(err: serde_json::Error) -> Self {
        HandlerError::Malformed(err.to_string())
    }
}
