//! Message object model (base / typed / text variants).
//!
//! Wire rules:
//! - base messages serialize to the JSON encoding of their content verbatim;
//! - typed/text messages serialize to an object with the reserved fields
//!   `_lctext` / `_lcattrs` / `_lctype`;
//! - a legacy shape `{"msg": {"type": "text", ...}, ...envelope}` is accepted
//!   on decode only (transport backward-compatibility path).
//!
//! Constructors always enforce a variant's fixed discriminator, so a decoded
//! message re-encodes to a wire payload indistinguishable from the original
//! for the fields the variant defines.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ChatBridgeError, Result};
use crate::protocol::codec::VariantDescriptor;

/// Discriminator carried by generic typed messages.
pub const TYPED_TAG: i64 = 0;
/// Discriminator carried by text messages (distinct sentinel).
pub const TEXT_TAG: i64 = -1;

/// Reserved wire field: text payload.
const WIRE_TEXT: &str = "_lctext";
/// Reserved wire field: structured attributes.
const WIRE_ATTRS: &str = "_lcattrs";
/// Reserved wire field: numeric discriminator.
const WIRE_TYPE: &str = "_lctype";

/// Content of a typed/text message.
///
/// The discriminator is private: it is fixed by the constructor and can never
/// be overridden by caller-supplied data.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedContent {
    pub text: String,
    pub attrs: Value,
    tag: i64,
}

impl TypedContent {
    /// Generic typed content (`_lctype = 0`).
    pub fn typed(text: impl Into<String>, attrs: Value) -> Self {
        Self {
            text: text.into(),
            attrs,
            tag: TYPED_TAG,
        }
    }

    /// Text content (`_lctype = -1`).
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attrs: Value::Object(Map::new()),
            tag: TEXT_TAG,
        }
    }

    pub fn tag(&self) -> i64 {
        self.tag
    }
}

/// Message content variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Opaque caller-defined content (base variant): string or structured.
    Raw(Value),
    /// Discriminated content carrying a numeric tag.
    Typed(TypedContent),
}

/// A single message, live or historical.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub content: Content,
    /// Milliseconds since epoch; defaults to creation time.
    pub timestamp: i64,
    /// Sender identifier, if known.
    pub from: Option<String>,
    pub need_receipt: bool,
    pub transient: bool,
}

impl Message {
    /// Base message wrapping opaque content.
    pub fn raw(content: Value) -> Self {
        Self::with_content(Content::Raw(content))
    }

    /// Generic typed message (`_lctype = 0`).
    pub fn typed(text: impl Into<String>, attrs: Value) -> Self {
        Self::with_content(Content::Typed(TypedContent::typed(text, attrs)))
    }

    /// Text message (`_lctype = -1`).
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(Content::Typed(TypedContent::text(text)))
    }

    fn with_content(content: Content) -> Self {
        Self {
            content,
            timestamp: now_ms(),
            from: None,
            need_receipt: false,
            transient: false,
        }
    }

    pub fn with_receipt(mut self, need_receipt: bool) -> Self {
        self.need_receipt = need_receipt;
        self
    }

    pub fn with_transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::raw(Value::String(s.to_owned()))
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::raw(Value::String(s))
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as i64)
}

/// Wire shape of typed/text messages (reserved fields).
#[derive(Debug, Serialize, Deserialize)]
struct WireTyped {
    #[serde(rename = "_lctext", default)]
    text: String,
    #[serde(rename = "_lcattrs", default = "empty_attrs")]
    attrs: Value,
    #[serde(rename = "_lctype")]
    tag: i64,
}

fn empty_attrs() -> Value {
    Value::Object(Map::new())
}

/// Sender/timestamp metadata carried by a wire envelope.
///
/// The legacy transport aliases the sender as `fromPeerId`.
fn apply_envelope_meta(mut message: Message, envelope: &Value) -> Message {
    let from = envelope
        .get("fromPeerId")
        .or_else(|| envelope.get("from"))
        .and_then(Value::as_str);
    if let Some(from) = from {
        message.from = Some(from.to_owned());
    }
    if let Some(ts) = envelope.get("timestamp").and_then(Value::as_i64) {
        message.timestamp = ts;
    }
    message
}

fn wire_tag(wire: &Value) -> Option<i64> {
    wire.get(WIRE_TYPE).and_then(Value::as_i64)
}

fn decode_tagged(wire: &Value, expected: i64) -> Result<Option<Message>> {
    if wire_tag(wire) != Some(expected) {
        return Ok(None);
    }
    // Discriminator matched: a malformed body from here on is a fault,
    // not a no-match.
    let body: WireTyped = serde_json::from_value(wire.clone())
        .map_err(|e| ChatBridgeError::Codec(format!("tagged body invalid: {e}")))?;
    let content = TypedContent {
        text: body.text,
        attrs: body.attrs,
        tag: expected,
    };
    Ok(Some(apply_envelope_meta(
        Message::with_content(Content::Typed(content)),
        wire,
    )))
}

fn encode_tagged(content: &TypedContent) -> Result<String> {
    let wire = WireTyped {
        text: content.text.clone(),
        attrs: content.attrs.clone(),
        tag: content.tag,
    };
    serde_json::to_string(&wire).map_err(|e| ChatBridgeError::Codec(format!("encode failed: {e}")))
}

/// Base variant: matches plain-string payloads; encodes opaque content verbatim.
pub fn raw_variant() -> VariantDescriptor {
    VariantDescriptor::new("raw")
        .with_decode(|wire| match wire {
            Value::String(s) => Ok(Some(Message::raw(Value::String(s.clone())))),
            _ => Ok(None),
        })
        .with_encode(|message| match &message.content {
            Content::Raw(v) => serde_json::to_string(v)
                .map(Some)
                .map_err(|e| ChatBridgeError::Codec(format!("encode failed: {e}"))),
            Content::Typed(_) => Ok(None),
        })
}

/// Generic typed variant: matches `_lctype == 0`; encodes any typed content.
pub fn typed_variant() -> VariantDescriptor {
    VariantDescriptor::new("typed")
        .with_decode(|wire| decode_tagged(wire, TYPED_TAG))
        .with_encode(|message| match &message.content {
            Content::Typed(c) => encode_tagged(c).map(Some),
            Content::Raw(_) => Ok(None),
        })
}

/// Text variant: matches `_lctype == -1` or the legacy nested shape;
/// encodes text-tagged content only.
pub fn text_variant() -> VariantDescriptor {
    VariantDescriptor::new("text")
        .with_decode(|wire| {
            if let Some(decoded) = decode_tagged(wire, TEXT_TAG)? {
                return Ok(Some(decoded));
            }
            if wire_tag(wire).is_some() {
                // Some other tagged variant; decline without checking the
                // legacy shape.
                return Ok(None);
            }
            decode_legacy_text(wire)
        })
        .with_encode(|message| match &message.content {
            Content::Typed(c) if c.tag() == TEXT_TAG => encode_tagged(c).map(Some),
            _ => Ok(None),
        })
}

/// Legacy transport shape: `{"msg": {"type": "text", ...}, ...envelope}`.
///
/// The nested `msg` access faults when absent (the check assumes the field
/// exists, as the original transport wrapper did); the registry's fault
/// isolation absorbs it and moves on to the next variant.
fn decode_legacy_text(wire: &Value) -> Result<Option<Message>> {
    let msg = wire
        .get("msg")
        .ok_or_else(|| ChatBridgeError::Codec("legacy shape: missing msg field".into()))?;
    if msg.get("type").and_then(Value::as_str) != Some("text") {
        return Ok(None);
    }
    let text = msg
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| ChatBridgeError::Codec("legacy text: missing text field".into()))?;
    Ok(Some(apply_envelope_meta(Message::text(text), wire)))
}
