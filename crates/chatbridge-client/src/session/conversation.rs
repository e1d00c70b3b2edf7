//! Conversation sessions.
//!
//! A session wraps one transport-level conversation. Construction is
//! two-phase: phase one copies the identity fields and binds the persistent
//! receive handler (so no inbound message is missed while phase two runs);
//! phase two fetches the membership list. `attach` only returns once both
//! phases are done, so callers never observe a half-hydrated session.

use std::sync::{Arc, RwLock};

use serde_json::Value;
use tokio::sync::oneshot;

use chatbridge_core::{ChatBridgeError, Message, MessageCodec, Result};

use crate::emitter::{Emitter, HandlerId};
use crate::notify::Notifier;
use crate::session::read_recover;
use crate::transport::{RawConversation, SendOptions};

/// Local event carrying each decoded inbound message.
pub const EVENT_MESSAGE: &str = "message";

pub struct ConversationSession {
    id: String,
    name: String,
    attr: Value,
    members: Vec<String>,
    raw: Arc<dyn RawConversation>,
    codec: Arc<RwLock<MessageCodec>>,
    emitter: Arc<Emitter<Message>>,
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("attr", &self.attr)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

impl ConversationSession {
    /// Async two-phase construction over a raw conversation handle.
    pub(crate) async fn attach(
        raw: Arc<dyn RawConversation>,
        codec: Arc<RwLock<MessageCodec>>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let emitter = Arc::new(Emitter::new());

        // Phase one: bind receive before anything is awaited. Inbound wire
        // payloads are decoded through the shared codec; matches are
        // re-emitted locally, each followed by one UI notify; payloads
        // matching no variant are dropped.
        {
            let emitter = emitter.clone();
            let codec = codec.clone();
            let conversation = raw.id().to_owned();
            raw.receive(Arc::new(move |wire: &Value| {
                // Guard dropped before any handler runs: a handler may call
                // back into assign(), which write-locks the same codec.
                let decoded = read_recover(&codec).decode(wire);
                match decoded {
                    Some(message) => {
                        emitter.emit(EVENT_MESSAGE, &message);
                        notifier.notify();
                    }
                    None => {
                        tracing::debug!(%conversation, "inbound payload matched no variant, dropped");
                    }
                }
            }));
        }

        // Phase two: membership hydration.
        let (tx, rx) = oneshot::channel();
        raw.list(Box::new(move |members| {
            let _ = tx.send(members);
        }));
        let members = rx
            .await
            .map_err(|_| ChatBridgeError::Internal("transport dropped list callback".into()))?;

        Ok(Self {
            id: raw.id().to_owned(),
            name: raw.name().to_owned(),
            attr: raw.attr(),
            members,
            raw,
            codec,
            emitter,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self) -> &Value {
        &self.attr
    }

    /// Membership as hydrated at attach time.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Subscribe to local events (see [`EVENT_MESSAGE`]).
    pub fn on(&self, event: &str, callback: impl Fn(&Message) + Send + Sync + 'static) -> HandlerId {
        self.emitter.on(event, Arc::new(callback))
    }

    pub fn once(
        &self,
        event: &str,
        callback: impl Fn(&Message) + Send + Sync + 'static,
    ) -> HandlerId {
        self.emitter.once(event, Arc::new(callback))
    }

    pub fn off(&self, event: &str, id: HandlerId) -> bool {
        self.emitter.off(event, id)
    }

    /// Fetch history, decoded through the same codec as live traffic.
    /// Entries matching no variant are silently omitted.
    pub async fn log(&self, options: Value) -> Result<Vec<Message>> {
        let (tx, rx) = oneshot::channel();
        self.raw.log(
            options,
            Box::new(move |entries| {
                let _ = tx.send(entries);
            }),
        );
        let entries = rx
            .await
            .map_err(|_| ChatBridgeError::Internal("transport dropped log callback".into()))?;

        let messages = {
            let codec = read_recover(&self.codec);
            entries.iter().filter_map(|wire| codec.decode(wire)).collect()
        };
        Ok(messages)
    }

    /// Join the conversation; resolves after the transport confirms.
    pub async fn join(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.raw.join(Box::new(move |()| {
            let _ = tx.send(());
        }));
        rx.await
            .map_err(|_| ChatBridgeError::Internal("transport dropped join callback".into()))
    }

    /// Send a message (bare strings coerce to base messages). Send options
    /// are derived from the message's delivery flags; resolves with the sent
    /// message once the transport acknowledges.
    pub async fn send(&self, message: impl Into<Message>) -> Result<Message> {
        let message = message.into();
        let payload = read_recover(&self.codec).encode(&message)?;
        let options = SendOptions {
            receipt: message.need_receipt,
            transient: message.transient,
        };

        let (tx, rx) = oneshot::channel();
        self.raw.send(
            payload,
            options,
            Box::new(move |()| {
                let _ = tx.send(());
            }),
        );
        rx.await
            .map_err(|_| ChatBridgeError::Internal("transport dropped send callback".into()))?;
        Ok(message)
    }

    /// Intentional no-op: the transport exposes no way to unbind the
    /// receive handler registered at attach time. Known limitation.
    pub fn destroy(&self) {}
}
