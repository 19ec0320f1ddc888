//! Inbound callback URL parsing

use std::collections::BTreeMap;

use tracing::debug;
use url::Url;

use crypto_session::{EncryptedEnvelope, NONCE_SIZE, PUBLIC_KEY_SIZE};
use wallet_protocol::{Action, RemoteError};

use crate::{LinkError, LinkResult, params};

/// A parsed wallet callback
#[derive(Debug)]
pub enum Callback {
    /// The wallet rejected the request (e.g. the user declined).
    ///
    /// Classified by the presence of `errorCode` regardless of path, so the
    /// action may be unknown. No decryption is attempted.
    Rejected {
        action: Option<Action>,
        error: RemoteError,
    },
    /// Successful connect: the wallet's encryption public key plus the
    /// encrypted session payload
    Connect {
        wallet_public_key: [u8; PUBLIC_KEY_SIZE],
        envelope: EncryptedEnvelope,
    },
    /// Successful response to any other action. Some wallets redirect back
    /// without a payload (notably for disconnect), so the envelope is
    /// optional; when `data` or `nonce` is present both must be.
    Response {
        action: Action,
        envelope: Option<EncryptedEnvelope>,
    },
}

/// Parse and classify an inbound callback URL.
///
/// The external channel may deliver arbitrary URLs; a path matching no known
/// action is an [`LinkError::UnrecognizedCallback`], which callers treat as
/// ignorable rather than fatal.
pub fn decode_callback(raw: &str) -> LinkResult<Callback> {
    let url = Url::parse(raw)?;
    let query: BTreeMap<String, String> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    // An explicit errorCode wins over path classification: the wallet
    // reports rejection on whatever redirect it has.
    if let Some(code) = query.get(params::ERROR_CODE) {
        debug!(code = %code, "callback carries wallet rejection");
        return Ok(Callback::Rejected {
            action: Action::from_callback_path(url.path()),
            error: RemoteError {
                code: code.clone(),
                message: query.get(params::ERROR_MESSAGE).cloned(),
                params: query,
            },
        });
    }

    let action = Action::from_callback_path(url.path())
        .ok_or_else(|| LinkError::UnrecognizedCallback(url.path().to_string()))?;

    match action {
        Action::Connect => {
            let wallet_public_key = fixed_field::<PUBLIC_KEY_SIZE>(
                &query,
                params::WALLET_ENCRYPTION_PUBLIC_KEY,
            )?;
            let envelope = require_envelope(&query)?;
            Ok(Callback::Connect {
                wallet_public_key,
                envelope,
            })
        }
        _ => {
            let envelope = match (
                query.contains_key(params::DATA),
                query.contains_key(params::NONCE),
            ) {
                (false, false) => None,
                _ => Some(require_envelope(&query)?),
            };
            Ok(Callback::Response { action, envelope })
        }
    }
}

fn require_envelope(query: &BTreeMap<String, String>) -> LinkResult<EncryptedEnvelope> {
    let nonce = fixed_field::<NONCE_SIZE>(query, params::NONCE)?;
    let ciphertext = b58_field(query, params::DATA)?;
    Ok(EncryptedEnvelope { nonce, ciphertext })
}

fn b58_field(query: &BTreeMap<String, String>, field: &'static str) -> LinkResult<Vec<u8>> {
    let value = query.get(field).ok_or(LinkError::MissingField(field))?;
    bs58::decode(value)
        .into_vec()
        .map_err(|source| LinkError::Encoding { field, source })
}

fn fixed_field<const N: usize>(
    query: &BTreeMap<String, String>,
    field: &'static str,
) -> LinkResult<[u8; N]> {
    let bytes = b58_field(query, field)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| LinkError::InvalidFieldLength {
            field,
            expected: N,
            actual,
        })
}
