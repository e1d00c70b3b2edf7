//! External UI-refresh boundary.
//!
//! Every locally delivered event (connection event, decoded conversation
//! message) triggers exactly one `notify()` after the application handler
//! runs, so reactive UIs re-render against consistent state.

/// Callback into the embedding UI's change detection.
pub trait Notifier: Send + Sync {
    fn notify(&self);
}

/// Notifier that does nothing, for headless embedding.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self) {}
}
