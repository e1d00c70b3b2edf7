//! Session layer: the top-level client facade and conversation sessions.

pub mod conversation;
pub mod facade;

pub use conversation::{ConversationSession, EVENT_MESSAGE};
pub use facade::RealtimeClient;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) fn read_recover<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn write_recover<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
