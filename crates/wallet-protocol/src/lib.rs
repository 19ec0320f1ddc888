//! Shared Protocol Definitions for the Wallet Deep-Link Client
//!
//! This crate contains the action kinds, cluster enum, and payload shapes
//! shared across the deep-link codec and the session state machine.

mod action;
mod payloads;

pub use action::*;
pub use payloads::*;

/// Default wallet universal-link base URL
pub const DEFAULT_WALLET_BASE_URL: &str = "https://phantom.app/ul/v1/";
