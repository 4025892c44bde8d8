//! Broadcast Module
//!
//! Disseminates every submitted value to every node using anti-entropy gossip over a
//! bounded neighbor set. Delivery is eventual: a client gets `broadcast_ok` as soon as
//! the value is recorded locally, and propagation happens in the background.
//!
//! ## Core Mechanisms
//! - **G-Set**: `ValueStore` only grows; merging a known value is a no-op, so duplicated
//!   or reordered gossip cannot corrupt state.
//! - **Outstanding deltas**: `OutstandingTracker` remembers, per neighbor, the values that
//!   neighbor has not acknowledged yet.
//! - **Tick-driven retry**: the disseminator resends whatever is still outstanding on every
//!   tick. A lost request or a lost ack simply leaves values outstanding for the next tick.
//! - **Short critical sections**: shared state is locked to compute a round and to record
//!   its ack, never while a request is in flight.
//!
//! ## Submodules
//! - **`store`**, **`topology`**, **`outstanding`**: the leaf data structures.
//! - **`state`**: the single owner of the three, enforcing the cross-cutting invariants.
//! - **`service`**: request entry points (`broadcast`, `read`, `topology`, `gossip`).
//! - **`disseminator`**: the periodic gossip loop.
//! - **`handlers`**: decoding of request bodies and reply encoding.

pub mod disseminator;
pub mod handlers;
pub mod outstanding;
pub mod protocol;
pub mod service;
pub mod state;
pub mod store;
pub mod topology;
pub mod types;
