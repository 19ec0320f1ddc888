//! Authenticated JSON payload encryption

use chacha20poly1305::{
    AeadCore, XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use rand::rngs::OsRng;
use serde::{Serialize, de::DeserializeOwned};
use x25519_dalek::SharedSecret;
use zeroize::Zeroizing;

use crate::{CryptoError, CryptoResult, NONCE_SIZE, SHARED_SECRET_SIZE};

/// Nonce + ciphertext pair produced by one `encrypt` call.
///
/// Transient: constructed per encryption, consumed per decryption. A nonce is
/// never reused with the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

/// Symmetric session key derived from X25519 key agreement.
///
/// Lives only in memory; the underlying cipher key is zeroized on drop.
pub struct SessionKey {
    cipher: XChaCha20Poly1305,
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey").finish_non_exhaustive()
    }
}

impl SessionKey {
    pub(crate) fn from_shared_secret(shared: &SharedSecret) -> CryptoResult<Self> {
        Self::from_bytes(*shared.as_bytes())
    }

    /// Build a session key directly from 32 secret bytes.
    ///
    /// The bytes must come from a key agreement or another cryptographically
    /// strong source; they are zeroized after the cipher is constructed.
    pub fn from_bytes(bytes: [u8; SHARED_SECRET_SIZE]) -> CryptoResult<Self> {
        let key = Zeroizing::new(bytes);
        let cipher = XChaCha20Poly1305::new_from_slice(&*key)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Encrypt a JSON-serializable payload under a fresh random 24-byte nonce
    pub fn encrypt<T: Serialize>(&self, payload: &T) -> CryptoResult<EncryptedEnvelope> {
        let plaintext = Zeroizing::new(
            serde_json::to_vec(payload).map_err(|e| CryptoError::Encryption(e.to_string()))?,
        );

        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        Ok(EncryptedEnvelope {
            nonce: nonce.into(),
            ciphertext,
        })
    }

    /// Decrypt and authenticate an envelope, then parse the JSON payload.
    ///
    /// Fails closed: any tamper, wrong key, or wrong nonce yields
    /// [`CryptoError::DecryptionFailed`] with no partial plaintext. Valid
    /// plaintext that is not the expected JSON shape yields
    /// [`CryptoError::MalformedPayload`].
    pub fn decrypt<T: DeserializeOwned>(&self, envelope: &EncryptedEnvelope) -> CryptoResult<T> {
        let nonce = XNonce::from(envelope.nonce);
        let plaintext = Zeroizing::new(
            self.cipher
                .decrypt(&nonce, envelope.ciphertext.as_slice())
                .map_err(|_| CryptoError::DecryptionFailed)?,
        );

        Ok(serde_json::from_slice(&plaintext)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::{Value, json};

    use super::*;
    use crate::KeyPair;

    fn test_key() -> SessionKey {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();
        let bob_public = bob.public_key_bytes();
        alice.diffie_hellman(&bob_public).unwrap()
    }

    #[test]
    fn roundtrip_preserves_payload() {
        let key = test_key();
        let payload = json!({ "session": "tok123", "public_key": "abc" });

        let envelope = key.encrypt(&payload).unwrap();
        let decrypted: Value = key.decrypt(&envelope).unwrap();
        assert_eq!(decrypted, payload);
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let key = test_key();
        let envelope = key.encrypt(&json!({ "session": "tok123" })).unwrap();

        for bit in 0..8 {
            let mut tampered = envelope.clone();
            tampered.ciphertext[0] ^= 1 << bit;
            let err = key.decrypt::<Value>(&tampered).unwrap_err();
            assert!(matches!(err, CryptoError::DecryptionFailed));
        }
    }

    #[test]
    fn tampered_nonce_fails_closed() {
        let key = test_key();
        let envelope = key.encrypt(&json!({ "session": "tok123" })).unwrap();

        let mut tampered = envelope.clone();
        tampered.nonce[NONCE_SIZE - 1] ^= 0x01;
        let err = key.decrypt::<Value>(&tampered).unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailed));
    }

    #[test]
    fn wrong_key_fails_closed() {
        let key = test_key();
        let other = test_key();

        let envelope = key.encrypt(&json!({ "session": "tok123" })).unwrap();
        let err = other.decrypt::<Value>(&envelope).unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailed));
    }

    #[test]
    fn wrong_shape_is_distinguishable_from_tamper() {
        #[derive(Debug, serde::Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            session: u64, // payload carries a string here
        }

        let key = test_key();
        let envelope = key.encrypt(&json!({ "session": "tok123" })).unwrap();
        let err = key.decrypt::<Expected>(&envelope).unwrap_err();
        assert!(matches!(err, CryptoError::MalformedPayload(_)));
    }

    #[test]
    fn nonces_do_not_collide() {
        let key = test_key();
        let mut seen = HashSet::new();

        // Birthday-bound sanity check over a 192-bit nonce space: any
        // collision in 10k draws indicates a broken random source.
        for _ in 0..10_000 {
            let envelope = key.encrypt(&json!({})).unwrap();
            assert!(seen.insert(envelope.nonce), "nonce reused");
        }
    }
}
