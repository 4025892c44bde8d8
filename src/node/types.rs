use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single envelope on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub src: NodeId,
    pub dest: NodeId,
    pub body: Body,
}

/// Message body.
///
/// The protocol-level fields (`type`, `msg_id`, `in_reply_to`) are typed; everything
/// else is kept as a raw JSON map and decoded on demand by the handler that owns the
/// message type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Body {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<u64>,

    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Body {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    /// Builds a body of the given type whose extra fields come from `payload`.
    ///
    /// `payload` must serialize to a JSON object (or unit); its keys become body fields.
    pub fn with_payload<T: Serialize>(kind: &str, payload: &T) -> Result<Self, serde_json::Error> {
        let mut body = Self::new(kind);
        match serde_json::to_value(payload)? {
            serde_json::Value::Object(fields) => body.fields = fields,
            serde_json::Value::Null => {}
            other => {
                return Err(serde::ser::Error::custom(format!(
                    "payload for '{}' must be an object, got {}",
                    kind, other
                )));
            }
        }
        Ok(body)
    }

    /// Decodes the extra fields into a typed request.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.fields.clone()))
    }
}
