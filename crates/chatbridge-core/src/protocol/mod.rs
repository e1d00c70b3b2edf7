//! Protocol modules (message object model + variant codec).
//!
//! This module hosts the wire-facing pieces:
//! - `message`: the base/typed/text message family and its reserved wire fields.
//! - `codec`: the ordered, extensible registry that maps wire payloads to
//!   message variants with priority override and fault isolation.
//!
//! All decoders are panic-free: a payload that matches no variant is a silent
//! no-match, and a fault inside one variant never aborts the remaining chain.

pub mod codec;
pub mod message;
