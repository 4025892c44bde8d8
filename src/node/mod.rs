//! Node Runtime Module
//!
//! Implements the Maelstrom node protocol that every cluster service runs on top of.
//! A node exchanges JSON envelopes with the workbench (or with other nodes) and
//! correlates asynchronous replies with the requests that caused them.
//!
//! ## Core Mechanisms
//! - **Envelope**: `{src, dest, body}` objects, one per line on the wire.
//! - **Registry**: Message types are mapped to async handlers; each inbound message runs in its own task.
//! - **RPC**: Outbound requests get a fresh `msg_id`; the matching `in_reply_to` completes a one-shot waiter.
//! - **Wires**: `wire` speaks stdin/stdout. Test builds add `network`, which routes
//!   between nodes inside one process.

pub mod error;
#[cfg(test)]
pub mod network;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod types;
pub mod wire;
