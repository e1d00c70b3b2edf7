//! Shared error type across chatbridge crates.

use thiserror::Error;

/// Application-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// connect() was never called before a gated operation.
    NotConnected,
    /// Transport reported no conversation for the requested identifier.
    ConversationNotFound,
    /// A variant registration omitted decode or encode capability.
    InvalidVariant,
    /// A genuine serialization fault inside one variant.
    Codec,
    /// Broken internal contract (e.g. a dropped one-shot callback).
    Internal,
}

impl ErrorCode {
    /// String representation surfaced to embedding applications.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotConnected => "NOT_CONNECTED",
            ErrorCode::ConversationNotFound => "CONVERSATION_NOT_FOUND",
            ErrorCode::InvalidVariant => "INVALID_VARIANT",
            ErrorCode::Codec => "CODEC",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ChatBridgeError>;

/// Unified error type used by core and client.
///
/// `Clone` is required because the shared connect deferred fans a single
/// `Result` out to every awaiter.
#[derive(Debug, Clone, Error)]
pub enum ChatBridgeError {
    #[error("not connected: connect() was never called")]
    NotConnected,
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),
    #[error("invalid variant: {0}")]
    InvalidVariant(String),
    #[error("codec: {0}")]
    Codec(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ChatBridgeError {
    /// Map internal error to a stable application-facing code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ChatBridgeError::NotConnected => ErrorCode::NotConnected,
            ChatBridgeError::ConversationNotFound(_) => ErrorCode::ConversationNotFound,
            ChatBridgeError::InvalidVariant(_) => ErrorCode::InvalidVariant,
            ChatBridgeError::Codec(_) => ErrorCode::Codec,
            ChatBridgeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
