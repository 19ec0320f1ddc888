//! Wallet Session - Deep-Link Handshake and Authenticated Operations
//!
//! Orchestrates the session lifecycle against a wallet reachable only via
//! platform deep links: connect handshake, disconnect, and arbitrary signed
//! operations. The state machine is the single source of truth for which
//! callback is currently expected; the transport is a fire-and-forget URL
//! launcher plus one callback entry point.

mod error;
mod launcher;
mod session;

pub use error::*;
pub use launcher::*;
pub use session::*;
