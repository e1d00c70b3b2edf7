//! Callback-shaped transport boundary.
//!
//! The underlying realtime transport is out of scope: its wire protocol,
//! heartbeat, and reconnection behavior are opaque and assumed correct. This
//! module only pins down the callback surface the rest of the crate bridges
//! into futures. One-shot callbacks fire exactly once; persistent handlers
//! fire once per delivered event and are removed by the id `on` returned.

use std::sync::Arc;

use serde_json::Value;

use crate::emitter::HandlerId;

/// One-shot result callback. The transport fires it exactly once.
pub type OnceCallback<T> = Box<dyn FnOnce(T) + Send>;

/// Persistent event handler.
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Send options derived from a message's delivery flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Request a delivery receipt.
    pub receipt: bool,
    /// Do not persist the message server-side.
    pub transient: bool,
}

/// The transport's connection-level surface.
pub trait Transport: Send + Sync {
    /// Issue the one-shot connect call; `on_result` fires exactly once with
    /// the transport's raw connection result.
    fn connect(&self, options: Value, on_result: OnceCallback<Value>);

    /// Close the live connection.
    fn close(&self);

    /// Look up a conversation; `on_result` fires once with the raw handle,
    /// or `None` when the server knows no such conversation.
    fn room(&self, options: Value, on_result: OnceCallback<Option<Arc<dyn RawConversation>>>);

    /// Generic event stream.
    fn on(&self, event: &str, handler: EventHandler) -> HandlerId;
    fn once(&self, event: &str, handler: EventHandler) -> HandlerId;
    fn off(&self, event: &str, id: HandlerId);
    fn emit(&self, event: &str, payload: Value);
}

/// One transport-level conversation. Its lifetime is managed by the
/// transport; sessions wrap it without owning it.
pub trait RawConversation: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn attr(&self) -> Value;

    /// Register a persistent inbound-message handler (raw wire payloads).
    /// There is no unregister surface; the binding lives as long as the
    /// conversation does.
    fn receive(&self, on_message: EventHandler);

    /// One-shot membership fetch.
    fn list(&self, on_result: OnceCallback<Vec<String>>);

    /// One-shot history fetch (raw wire payloads, oldest first).
    fn log(&self, options: Value, on_result: OnceCallback<Vec<Value>>);

    /// Join the conversation; `on_done` fires once the server confirms.
    fn join(&self, on_done: OnceCallback<()>);

    /// Send a serialized payload; `on_done` fires on acknowledgement.
    fn send(&self, payload: String, options: SendOptions, on_done: OnceCallback<()>);
}
