//! Local event emitter backing conversation sessions.
//!
//! Handlers are keyed by event name and removed by the id `on` returned.
//! `emit` snapshots the handler list before invoking anything so user code
//! can re-subscribe from inside a handler without deadlocking on the map.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

/// Opaque handler registration id.
pub type HandlerId = u64;

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Entry<T> {
    id: HandlerId,
    once: bool,
    handler: Handler<T>,
}

/// Event name -> ordered handler list.
pub struct Emitter<T> {
    handlers: DashMap<String, Vec<Entry<T>>>,
    next_id: AtomicU64,
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Emitter<T> {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn on(&self, event: &str, handler: Handler<T>) -> HandlerId {
        self.insert(event, handler, false)
    }

    /// Like `on`, but the handler is dropped after its first delivery.
    pub fn once(&self, event: &str, handler: Handler<T>) -> HandlerId {
        self.insert(event, handler, true)
    }

    fn insert(&self, event: &str, handler: Handler<T>, once: bool) -> HandlerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .entry(event.to_owned())
            .or_default()
            .push(Entry { id, once, handler });
        id
    }

    /// Remove one handler. Returns whether anything was removed.
    pub fn off(&self, event: &str, id: HandlerId) -> bool {
        let Some(mut entries) = self.handlers.get_mut(event) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    /// Deliver `payload` to every handler registered for `event`.
    /// Returns the number of handlers invoked.
    pub fn emit(&self, event: &str, payload: &T) -> usize {
        let snapshot: Vec<Handler<T>> = {
            let Some(mut entries) = self.handlers.get_mut(event) else {
                return 0;
            };
            let handlers = entries.iter().map(|e| e.handler.clone()).collect();
            entries.retain(|e| !e.once);
            handlers
        };
        // Guard released: user code may call back into this emitter.
        for handler in &snapshot {
            handler(payload);
        }
        snapshot.len()
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, |e| e.len())
    }
}
