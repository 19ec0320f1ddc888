//! Encrypted payload shapes and remote error results

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload the wallet encrypts into the connect callback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectResponse {
    /// Wallet public key, base58 (for display and on-chain use, not the
    /// encryption key from the query string)
    pub public_key: String,
    /// Opaque session token presented on subsequent authenticated requests
    pub session: String,
}

/// Payload encrypted into an outbound disconnect request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisconnectRequest {
    pub session: String,
}

/// Payload encrypted into an outbound signed-operation request.
///
/// Known fields are typed; everything else rides along untouched so new
/// operations do not require a codec change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignRequest {
    pub session: String,
    #[serde(flatten)]
    pub params: Value,
}

/// Protocol-level rejection reported by the wallet via query parameters.
///
/// Carried verbatim: the wallet declining a request (e.g. the user pressed
/// cancel) is a normal negative outcome, not a fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteError {
    /// Value of the `errorCode` query parameter
    pub code: String,
    /// Value of the `errorMessage` query parameter, if present
    pub message: Option<String>,
    /// All query parameters of the callback, untouched
    pub params: BTreeMap<String, String>,
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "wallet rejected request: {} ({})", self.code, message),
            None => write!(f, "wallet rejected request: {}", self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn connect_response_parses_wire_shape() {
        let parsed: ConnectResponse = serde_json::from_value(json!({
            "public_key": "BSFtCudqo6BU1eBEjfDPZwyDRBpAFa2onqaBGKh8ZJ9Z",
            "session": "tok123",
        }))
        .unwrap();
        assert_eq!(parsed.session, "tok123");
    }

    #[test]
    fn sign_request_flattens_extra_params() {
        let request = SignRequest {
            session: "tok123".into(),
            params: json!({ "message": "deadbeef", "display": "utf8" }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["session"], "tok123");
        assert_eq!(value["message"], "deadbeef");
    }
}
