//! Session error types

use thiserror::Error;

/// Session operation error
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Connect already in flight")]
    AlreadyConnecting,

    #[error("Session already established")]
    AlreadyEstablished,

    #[error("Session not established")]
    NotEstablished,

    #[error("Handshake failed: could not decrypt session payload")]
    HandshakeDecryption,

    #[error("Crypto error: {0}")]
    Crypto(#[from] crypto_session::CryptoError),

    #[error("Link error: {0}")]
    Link(#[from] deeplink::LinkError),
}

pub type SessionResult<T> = Result<T, SessionError>;
