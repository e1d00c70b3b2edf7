//! Top-level facade crate for chatbridge.
//!
//! Re-exports the core types and the client library so applications can
//! depend on a single crate.

pub mod core {
    pub use chatbridge_core::*;
}

pub mod client {
    pub use chatbridge_client::*;
}
