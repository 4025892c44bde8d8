//! Gossip Broadcast Node Library
//!
//! This library crate defines the modules that make up a broadcast node running under
//! the Maelstrom workbench. The binary (`main.rs`) only wires them together.
//!
//! ## Architecture Modules
//! - **`node`**: The protocol runtime. Envelope types, message ids, request/reply
//!   correlation, the handler registry, and the stdio and in-memory wires.
//! - **`broadcast`**: The anti-entropy engine. A grow-only value set, per-neighbor
//!   outstanding deltas, and a periodic disseminator that resends until acknowledged.
//! - **`config`**: Tunables for the dissemination loop and logging.

pub mod broadcast;
pub mod config;
pub mod node;
