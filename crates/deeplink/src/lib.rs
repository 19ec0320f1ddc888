//! Deep-Link Codec for Wallet Round Trips
//!
//! Serializes outbound requests as wallet universal links and parses the
//! callback URLs the wallet redirects back to. Binary fields (public keys,
//! nonces, ciphertexts) travel base58-encoded in query parameters; this crate
//! performs no I/O and holds no secrets.

mod decode;
mod encode;
mod error;

pub use decode::*;
pub use encode::*;
pub use error::*;

/// Query parameter names shared with the wallet
pub mod params {
    pub const DAPP_ENCRYPTION_PUBLIC_KEY: &str = "dapp_encryption_public_key";
    pub const WALLET_ENCRYPTION_PUBLIC_KEY: &str = "phantom_encryption_public_key";
    pub const CLUSTER: &str = "cluster";
    pub const APP_URL: &str = "app_url";
    pub const REDIRECT_LINK: &str = "redirect_link";
    pub const NONCE: &str = "nonce";
    pub const PAYLOAD: &str = "payload";
    pub const DATA: &str = "data";
    pub const ERROR_CODE: &str = "errorCode";
    pub const ERROR_MESSAGE: &str = "errorMessage";
}
