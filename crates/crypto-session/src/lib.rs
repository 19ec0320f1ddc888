//! Crypto Session - Key Agreement and Payload Encryption
//!
//! Provides X25519 key agreement with XChaCha20-Poly1305 authenticated
//! encryption of JSON payloads, as used by the wallet deep-link protocol.

mod codec;
mod error;
mod keys;

pub use codec::*;
pub use error::*;
pub use keys::*;

/// Nonce size for XChaCha20-Poly1305 (192 bits / 24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Authentication tag size (128 bits / 16 bytes)
pub const TAG_SIZE: usize = 16;

/// Public key size (256 bits / 32 bytes)
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Shared secret size (256 bits / 32 bytes)
pub const SHARED_SECRET_SIZE: usize = 32;
