//! Deep-link codec error types

use thiserror::Error;

/// Link encode/decode error
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Callback path matches no known action: {0}")]
    UnrecognizedCallback(String),

    #[error("Missing required query parameter: {0}")]
    MissingField(&'static str),

    #[error("Invalid base58 in query parameter {field}: {source}")]
    Encoding {
        field: &'static str,
        #[source]
        source: bs58::decode::Error,
    },

    #[error("Query parameter {field} has wrong length: expected {expected} bytes, got {actual}")]
    InvalidFieldLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type LinkResult<T> = Result<T, LinkError>;
