//! Outbound request link construction

use url::Url;

use crypto_session::{EncryptedEnvelope, PUBLIC_KEY_SIZE};
use wallet_protocol::{Action, Cluster};

use crate::{LinkResult, params};

/// Build the unauthenticated connect request URL.
///
/// Only the public half of the fresh key pair and plain metadata travel in
/// the query string; nothing here is secret.
pub fn connect_url(
    base: &Url,
    dapp_public_key: &[u8; PUBLIC_KEY_SIZE],
    cluster: Cluster,
    app_url: &str,
    redirect_link: &Url,
) -> LinkResult<Url> {
    let mut url = base.join(Action::Connect.path())?;
    url.query_pairs_mut()
        .append_pair(
            params::DAPP_ENCRYPTION_PUBLIC_KEY,
            &bs58::encode(dapp_public_key).into_string(),
        )
        .append_pair(params::CLUSTER, cluster.as_str())
        .append_pair(params::APP_URL, app_url)
        .append_pair(params::REDIRECT_LINK, redirect_link.as_str());
    Ok(url)
}

/// Build an authenticated request URL carrying an encrypted payload.
///
/// Used for disconnect and all signed operations: the envelope's nonce and
/// ciphertext ride as separate base58 query parameters.
pub fn encrypted_request_url(
    base: &Url,
    action: Action,
    dapp_public_key: &[u8; PUBLIC_KEY_SIZE],
    envelope: &EncryptedEnvelope,
    redirect_link: &Url,
) -> LinkResult<Url> {
    let mut url = base.join(action.path())?;
    url.query_pairs_mut()
        .append_pair(
            params::DAPP_ENCRYPTION_PUBLIC_KEY,
            &bs58::encode(dapp_public_key).into_string(),
        )
        .append_pair(params::NONCE, &bs58::encode(&envelope.nonce).into_string())
        .append_pair(params::REDIRECT_LINK, redirect_link.as_str())
        .append_pair(
            params::PAYLOAD,
            &bs58::encode(&envelope.ciphertext).into_string(),
        );
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://phantom.app/ul/v1/").unwrap()
    }

    #[test]
    fn connect_url_carries_required_fields() {
        let key = [7u8; 32];
        let redirect = Url::parse("pbvote://onConnect").unwrap();
        let url = connect_url(&base(), &key, Cluster::MainnetBeta, "https://pbvote.com/", &redirect)
            .unwrap();

        assert!(url.as_str().starts_with("https://phantom.app/ul/v1/connect?"));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&(
            params::DAPP_ENCRYPTION_PUBLIC_KEY.into(),
            bs58::encode(&key).into_string()
        )));
        assert!(pairs.contains(&(params::CLUSTER.into(), "mainnet-beta".into())));
        assert!(pairs.contains(&(params::APP_URL.into(), "https://pbvote.com/".into())));
        assert!(pairs.contains(&(params::REDIRECT_LINK.into(), "pbvote://onConnect".into())));
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let key = [1u8; 32];
        let redirect = Url::parse("pbvote://onConnect").unwrap();
        let url = connect_url(
            &base(),
            &key,
            Cluster::Devnet,
            "https://pbvote.com/?a=b&c=d",
            &redirect,
        )
        .unwrap();

        // The raw query must not contain an unescaped nested query
        assert!(!url.query().unwrap().contains("a=b&c=d"));
        // ...but the decoded parameter round-trips
        let (_, app_url) = url
            .query_pairs()
            .find(|(k, _)| k == params::APP_URL)
            .unwrap();
        assert_eq!(app_url, "https://pbvote.com/?a=b&c=d");
    }

    #[test]
    fn disconnect_url_carries_envelope() {
        let key = [9u8; 32];
        let envelope = EncryptedEnvelope {
            nonce: [3u8; 24],
            ciphertext: vec![0xde, 0xad, 0xbe, 0xef],
        };
        let redirect = Url::parse("pbvote://onDisconnect").unwrap();
        let url =
            encrypted_request_url(&base(), Action::Disconnect, &key, &envelope, &redirect).unwrap();

        assert!(url.path().ends_with("/disconnect"));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&(
            params::NONCE.into(),
            bs58::encode(&envelope.nonce).into_string()
        )));
        assert!(pairs.contains(&(
            params::PAYLOAD.into(),
            bs58::encode(&envelope.ciphertext).into_string()
        )));
    }
}
