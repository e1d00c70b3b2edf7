//! chatbridge client library entry.
//!
//! This crate bridges a callback-based realtime transport into a
//! future-oriented session model: the connection gate turns the transport's
//! one-shot connect callback into a shared deferred, the session facade
//! routes conversation lookups through that gate, and conversation sessions
//! re-emit decoded wire messages as typed local events. It is intended to be
//! consumed by embedding applications and by integration tests.

pub mod emitter;
pub mod gate;
pub mod notify;
pub mod session;
pub mod transport;

pub use emitter::{Emitter, HandlerId};
pub use gate::{ConnectionGate, GateState};
pub use notify::{Notifier, NoopNotifier};
pub use session::{ConversationSession, RealtimeClient, EVENT_MESSAGE};
pub use transport::{EventHandler, OnceCallback, RawConversation, SendOptions, Transport};
