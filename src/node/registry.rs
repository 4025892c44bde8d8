//! Message Handler Registry
//!
//! Maps message types (e.g. "broadcast") to async closures. Services register their
//! handlers at startup; the runtime looks them up for every inbound request.

use super::error::HandlerError;
use super::types::{Body, Message};

use dashmap::DashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type-erased async handler. Resolves to the reply body, or to an error that is
/// turned into an `error` reply.
pub type HandlerFn = Arc<
    dyn Fn(Message) -> Pin<Box<dyn Future<Output = Result<Body, HandlerError>> + Send>>
        + Send
        + Sync,
>;

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: DashMap<String, HandlerFn>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `kind`, replacing any previous handler for that type.
    pub fn register<F, Fut>(&self, kind: &str, handler: F)
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Body, HandlerError>> + Send + 'static,
    {
        let handler_fn: HandlerFn = Arc::new(move |msg: Message| {
            Box::pin(handler(msg)) as Pin<Box<dyn Future<Output = Result<Body, HandlerError>> + Send>>
        });

        if self.handlers.insert(kind.to_string(), handler_fn).is_some() {
            tracing::warn!("Replaced handler for message type '{}'", kind);
        } else {
            tracing::debug!("Registered handler for message type '{}'", kind);
        }
    }

    /// Returns a clone of the handler so no map guard is held while it runs.
    pub fn get(&self, kind: &str) -> Option<HandlerFn> {
        self.handlers.get(kind).map(|entry| entry.value().clone())
    }
}
