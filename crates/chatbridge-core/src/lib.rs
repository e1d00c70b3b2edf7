//! chatbridge core: transport-agnostic message model, wire codec, and error types.
//!
//! This crate defines the message object model, the ordered variant registry
//! that decodes heterogeneous wire payloads, and the error surface shared by
//! the client runtime. It intentionally carries no transport or runtime
//! dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `ChatBridgeError`/`Result`; a wire
//! payload that matches no variant is a silent no-match, never a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ChatBridgeError, ErrorCode, Result};
pub use protocol::codec::{MessageCodec, VariantDescriptor};
pub use protocol::message::{Content, Message, TypedContent, TEXT_TAG, TYPED_TAG};
