//! In-process mock transport shared by the integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use chatbridge_client::emitter::{Emitter, HandlerId};
use chatbridge_client::notify::Notifier;
use chatbridge_client::transport::{
    EventHandler, OnceCallback, RawConversation, SendOptions, Transport,
};

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Notifier that counts invocations.
#[derive(Default)]
pub struct CountingNotifier {
    count: AtomicUsize,
}

impl CountingNotifier {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Notifier for CountingNotifier {
    fn notify(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// One mock conversation with scripted membership/history and captured sends.
pub struct MockConversation {
    pub id: String,
    pub name: String,
    pub attr: Value,
    pub members: Vec<String>,
    pub history: Vec<Value>,
    receive_handlers: Mutex<Vec<EventHandler>>,
    pub sent: Mutex<Vec<(String, SendOptions)>>,
    pub joined: AtomicBool,
    /// Order of boundary calls, for lifecycle assertions.
    pub call_log: Mutex<Vec<&'static str>>,
}

impl MockConversation {
    pub fn new(id: &str) -> Arc<Self> {
        Self::build(id, vec![], vec![])
    }

    pub fn with_members(id: &str, members: &[&str]) -> Arc<Self> {
        Self::build(id, members.iter().map(|m| (*m).to_owned()).collect(), vec![])
    }

    pub fn with_history(id: &str, history: Vec<Value>) -> Arc<Self> {
        Self::build(id, vec![], history)
    }

    fn build(id: &str, members: Vec<String>, history: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_owned(),
            name: format!("room {id}"),
            attr: serde_json::json!({}),
            members,
            history,
            receive_handlers: Mutex::new(vec![]),
            sent: Mutex::new(vec![]),
            joined: AtomicBool::new(false),
            call_log: Mutex::new(vec![]),
        })
    }

    /// Deliver one raw wire payload to every registered receive handler.
    pub fn push(&self, wire: Value) {
        let handlers = self.receive_handlers.lock().unwrap().clone();
        for handler in handlers {
            handler(&wire);
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(String, SendOptions)> {
        self.sent.lock().unwrap().clone()
    }
}

impl RawConversation for MockConversation {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attr(&self) -> Value {
        self.attr.clone()
    }

    fn receive(&self, on_message: EventHandler) {
        self.call_log.lock().unwrap().push("receive_bound");
        self.receive_handlers.lock().unwrap().push(on_message);
    }

    fn list(&self, on_result: OnceCallback<Vec<String>>) {
        self.call_log.lock().unwrap().push("list_called");
        on_result(self.members.clone());
    }

    fn log(&self, _options: Value, on_result: OnceCallback<Vec<Value>>) {
        on_result(self.history.clone());
    }

    fn join(&self, on_done: OnceCallback<()>) {
        self.joined.store(true, Ordering::SeqCst);
        on_done(());
    }

    fn send(&self, payload: String, options: SendOptions, on_done: OnceCallback<()>) {
        self.sent.lock().unwrap().push((payload, options));
        on_done(());
    }
}

/// What the mock does with a connect callback.
#[derive(Clone, Copy)]
enum ConnectMode {
    /// Fire immediately with the scripted result.
    Immediate,
    /// Park the callback until `release_connect`.
    Hold,
    /// Drop the callback without firing it (contract violation).
    Drop,
}

/// Mock transport with scriptable connect behavior.
pub struct MockTransport {
    pub connect_result: Value,
    connect_mode: ConnectMode,
    held: Mutex<Vec<OnceCallback<Value>>>,
    conversations: Mutex<HashMap<String, Arc<MockConversation>>>,
    events: Emitter<Value>,
    pub closed: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Self::build(ConnectMode::Immediate)
    }

    pub fn holding_connect() -> Arc<Self> {
        Self::build(ConnectMode::Hold)
    }

    pub fn dropping_connect() -> Arc<Self> {
        Self::build(ConnectMode::Drop)
    }

    fn build(connect_mode: ConnectMode) -> Arc<Self> {
        Arc::new(Self {
            connect_result: serde_json::json!({"clientId": "client-1"}),
            connect_mode,
            held: Mutex::new(vec![]),
            conversations: Mutex::new(HashMap::new()),
            events: Emitter::new(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn add_conversation(&self, conv: Arc<MockConversation>) {
        self.conversations.lock().unwrap().insert(conv.id.clone(), conv);
    }

    /// Fire the oldest parked connect callback.
    pub fn release_connect(&self) {
        let cb = {
            let mut held = self.held.lock().unwrap();
            if held.is_empty() {
                None
            } else {
                Some(held.remove(0))
            }
        };
        if let Some(cb) = cb {
            cb(self.connect_result.clone());
        }
    }

    pub fn held_connects(&self) -> usize {
        self.held.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn connect(&self, _options: Value, on_result: OnceCallback<Value>) {
        match self.connect_mode {
            ConnectMode::Immediate => on_result(self.connect_result.clone()),
            ConnectMode::Hold => self.held.lock().unwrap().push(on_result),
            ConnectMode::Drop => drop(on_result),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn room(&self, options: Value, on_result: OnceCallback<Option<Arc<dyn RawConversation>>>) {
        let id = options
            .get("room")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let conv = self.conversations.lock().unwrap().get(id).cloned();
        on_result(conv.map(|c| c as Arc<dyn RawConversation>));
    }

    fn on(&self, event: &str, handler: EventHandler) -> HandlerId {
        self.events.on(event, handler)
    }

    fn once(&self, event: &str, handler: EventHandler) -> HandlerId {
        self.events.once(event, handler)
    }

    fn off(&self, event: &str, id: HandlerId) {
        self.events.off(event, id);
    }

    fn emit(&self, event: &str, payload: Value) {
        self.events.emit(event, &payload);
    }
}
