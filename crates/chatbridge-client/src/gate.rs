//! Connection gate: one shared deferred for the transport connect callback.
//!
//! State machine: `Unconnected -> Connecting -> Connected`. The transport's
//! one-shot connect callback is bridged through a `oneshot` channel into a
//! `Shared` future; every gated operation awaits a clone of that future, so
//! all dependents observe the single settlement. None of this carries a
//! timeout: a transport that never fires its callback leaves the attempt
//! pending forever.

use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use serde_json::Value;
use tokio::sync::oneshot;

use chatbridge_core::{ChatBridgeError, Result};

use crate::transport::Transport;

/// The shared connect deferred. Cloning is cheap; every clone settles with
/// the same result.
pub type ConnectFuture = Shared<BoxFuture<'static, Result<Value>>>;

/// Observable gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// `connect` was never called.
    Unconnected,
    /// A connect attempt is pending.
    Connecting,
    /// The tracked attempt has settled.
    Connected,
}

/// Owns the single tracked connection attempt.
#[derive(Default)]
pub struct ConnectionGate {
    pending: Mutex<Option<ConnectFuture>>,
}

impl ConnectionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a connect attempt and track its deferred.
    ///
    /// Calling this again while an attempt is pending or resolved replaces
    /// the tracked deferred (earlier awaiters keep their clone of the old
    /// one and still settle).
    pub fn connect(&self, transport: &Arc<dyn Transport>, options: Value) -> ConnectFuture {
        let (tx, rx) = oneshot::channel::<Value>();
        transport.connect(
            options,
            Box::new(move |data| {
                let _ = tx.send(data);
            }),
        );
        let fut: ConnectFuture = async move {
            rx.await
                .map_err(|_| ChatBridgeError::Internal("transport dropped connect callback".into()))
        }
        .boxed()
        .shared();

        let mut slot = lock_recover(&self.pending);
        if slot.is_some() {
            tracing::warn!("connect() called again; replacing the tracked attempt");
        }
        *slot = Some(fut.clone());
        fut
    }

    /// Hand out the tracked deferred, failing fast when `connect` was never
    /// called (gated operations must error, not hang).
    pub fn wait(&self) -> Result<ConnectFuture> {
        lock_recover(&self.pending)
            .clone()
            .ok_or(ChatBridgeError::NotConnected)
    }

    pub fn state(&self) -> GateState {
        match lock_recover(&self.pending).as_ref() {
            None => GateState::Unconnected,
            Some(fut) => match fut.peek() {
                None => GateState::Connecting,
                Some(_) => GateState::Connected,
            },
        }
    }
}

fn lock_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
