//! Top-level client facade.
//!
//! A `RealtimeClient` is what the embedding application holds: connect/close,
//! generic event passthrough (each delivery followed by one UI notify), the
//! conversation factory routed through the connection gate, and codec variant
//! registration. Each facade owns its own codec registry; nothing is shared
//! across unrelated facade instances.

use std::sync::{Arc, RwLock};

use serde_json::Value;
use tokio::sync::oneshot;

use chatbridge_core::{ChatBridgeError, MessageCodec, Result, VariantDescriptor};

use crate::emitter::HandlerId;
use crate::gate::{ConnectionGate, GateState};
use crate::notify::Notifier;
use crate::session::{conversation::ConversationSession, write_recover};
use crate::transport::Transport;

pub struct RealtimeClient {
    transport: Arc<dyn Transport>,
    gate: ConnectionGate,
    codec: Arc<RwLock<MessageCodec>>,
    notifier: Arc<dyn Notifier>,
}

impl RealtimeClient {
    /// Build a client over `transport`. The codec starts with the built-in
    /// variants; `assign` extends it for this facade's lifetime.
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            gate: ConnectionGate::new(),
            codec: Arc::new(RwLock::new(MessageCodec::with_builtins())),
            notifier,
        }
    }

    /// Connect to the transport, resolving with its raw connection result.
    pub async fn connect(&self, options: Value) -> Result<Value> {
        self.gate.connect(&self.transport, options).await
    }

    /// Like `connect`, additionally invoking a legacy-style callback with
    /// the raw result.
    pub async fn connect_with(
        &self,
        options: Value,
        callback: impl FnOnce(&Value) + Send,
    ) -> Result<Value> {
        let data = self.connect(options).await?;
        callback(&data);
        Ok(data)
    }

    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    /// Close the connection. Awaits the connect deferred first; in-flight
    /// conversation hydration is not cancelled.
    pub async fn close(&self) -> Result<()> {
        self.gate.wait()?.await?;
        self.transport.close();
        Ok(())
    }

    /// Subscribe to a transport event. The callback runs first, then one
    /// UI notify per delivery.
    pub fn on(&self, event: &str, callback: impl Fn(&Value) + Send + Sync + 'static) -> HandlerId {
        let notifier = self.notifier.clone();
        self.transport.on(
            event,
            Arc::new(move |data| {
                callback(data);
                notifier.notify();
            }),
        )
    }

    /// One-shot subscription, same notify contract as `on`.
    pub fn once(&self, event: &str, callback: impl Fn(&Value) + Send + Sync + 'static) -> HandlerId {
        let notifier = self.notifier.clone();
        self.transport.once(
            event,
            Arc::new(move |data| {
                callback(data);
                notifier.notify();
            }),
        )
    }

    pub fn off(&self, event: &str, id: HandlerId) {
        self.transport.off(event, id);
    }

    pub fn emit(&self, event: &str, payload: Value) {
        self.transport.emit(event, payload);
    }

    /// Obtain a conversation session. Awaits the connect deferred, looks the
    /// conversation up on the transport, and resolves only after the
    /// session's membership hydration completes.
    pub async fn room(&self, options: Value) -> Result<ConversationSession> {
        self.gate.wait()?.await?;

        let (tx, rx) = oneshot::channel();
        self.transport.room(
            options.clone(),
            Box::new(move |raw| {
                let _ = tx.send(raw);
            }),
        );
        let raw = rx
            .await
            .map_err(|_| ChatBridgeError::Internal("transport dropped room callback".into()))?;
        let raw = raw.ok_or_else(|| {
            ChatBridgeError::ConversationNotFound(requested_id(&options))
        })?;

        ConversationSession::attach(raw, self.codec.clone(), self.notifier.clone()).await
    }

    /// Like `room`, additionally invoking a legacy-style callback with the
    /// hydrated session before resolving.
    pub async fn room_with(
        &self,
        options: Value,
        callback: impl FnOnce(&ConversationSession) + Send,
    ) -> Result<ConversationSession> {
        let session = self.room(options).await?;
        callback(&session);
        Ok(session)
    }

    /// Alias for `room`.
    pub async fn conv(&self, options: Value) -> Result<ConversationSession> {
        self.room(options).await
    }

    /// Register an application message variant; it takes decode priority
    /// over everything registered before it.
    pub fn assign(&self, variant: VariantDescriptor) -> Result<()> {
        write_recover(&self.codec).register(variant)
    }
}

/// Best-effort identifier for error messages; the options shape is opaque.
fn requested_id(options: &Value) -> String {
    options
        .get("room")
        .or_else(|| options.get("id"))
        .and_then(Value::as_str)
        .unwrap_or("<unspecified>")
        .to_owned()
}
