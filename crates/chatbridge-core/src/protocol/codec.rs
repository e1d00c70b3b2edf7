//! Ordered variant registry (decode priority + fault isolation).
//!
//! Decoding walks the registered variants most-recent-first and accepts the
//! first match. Applications can therefore override a built-in variant by
//! registering their own without removing anything. A fault inside one
//! variant's decoder is logged and suppressed so the remaining chain still
//! runs; a payload matching no variant is a silent no-match, not an error.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{ChatBridgeError, Result};
use crate::protocol::message::{self, Message};

type DecodeFn = Arc<dyn Fn(&Value) -> Result<Option<Message>> + Send + Sync>;
type EncodeFn = Arc<dyn Fn(&Message) -> Result<Option<String>> + Send + Sync>;

/// One registered message variant: a named decode/encode pair.
///
/// Both capabilities are optional at the descriptor level so that a
/// registration missing either one can be rejected explicitly; a registered
/// descriptor always carries both.
#[derive(Clone)]
pub struct VariantDescriptor {
    name: String,
    decode: Option<DecodeFn>,
    encode: Option<EncodeFn>,
}

impl VariantDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decode: None,
            encode: None,
        }
    }

    /// Attach the decode capability: `Ok(None)` is a no-match, `Err` a fault.
    pub fn with_decode(
        mut self,
        f: impl Fn(&Value) -> Result<Option<Message>> + Send + Sync + 'static,
    ) -> Self {
        self.decode = Some(Arc::new(f));
        self
    }

    /// Attach the encode capability: `Ok(None)` means "not my variant".
    pub fn with_encode(
        mut self,
        f: impl Fn(&Message) -> Result<Option<String>> + Send + Sync + 'static,
    ) -> Self {
        self.encode = Some(Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for VariantDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantDescriptor")
            .field("name", &self.name)
            .field("decode", &self.decode.is_some())
            .field("encode", &self.encode.is_some())
            .finish()
    }
}

/// Priority-ordered message codec.
#[derive(Clone, Debug, Default)]
pub struct MessageCodec {
    variants: Vec<VariantDescriptor>,
}

impl MessageCodec {
    /// Empty registry (no variants, every decode is a no-match).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in variants.
    ///
    /// Registration order raw → typed → text yields the decode order
    /// text → typed → raw.
    pub fn with_builtins() -> Self {
        let mut codec = Self::empty();
        for variant in [
            message::raw_variant(),
            message::typed_variant(),
            message::text_variant(),
        ] {
            // Built-ins always carry both capabilities.
            let _ = codec.register(variant);
        }
        codec
    }

    /// Insert `variant` at the front of the priority order.
    ///
    /// Rejects descriptors missing decode or encode capability.
    pub fn register(&mut self, variant: VariantDescriptor) -> Result<()> {
        if variant.decode.is_none() || variant.encode.is_none() {
            return Err(ChatBridgeError::InvalidVariant(format!(
                "variant {:?} must provide both decode and encode",
                variant.name
            )));
        }
        self.variants.insert(0, variant);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Decode a wire payload through the priority order.
    ///
    /// Returns the first variant's match; `None` if every variant declines
    /// or faults. A single variant's fault never aborts the walk.
    pub fn decode(&self, wire: &Value) -> Option<Message> {
        for variant in &self.variants {
            let Some(decode) = &variant.decode else {
                continue;
            };
            match decode(wire) {
                Ok(Some(message)) => return Some(message),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(variant = %variant.name, error = %e, "decoder fault, trying next");
                }
            }
        }
        None
    }

    /// Encode a message via the first variant that claims it.
    pub fn encode(&self, message: &Message) -> Result<String> {
        for variant in &self.variants {
            let Some(encode) = &variant.encode else {
                continue;
            };
            if let Some(wire) = encode(message)? {
                return Ok(wire);
            }
        }
        Err(ChatBridgeError::Codec(
            "no registered variant can encode this message".into(),
        ))
    }
}
