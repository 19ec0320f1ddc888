//! One-time X25519 key agreement

use rand::rngs::OsRng;
use x25519_dalek::{EphemeralSecret, PublicKey};

use crate::{CryptoError, CryptoResult, PUBLIC_KEY_SIZE, SessionKey};

/// One-time key pair for the deep-link handshake.
///
/// Generated fresh per connect attempt; only the public half ever leaves the
/// process. Performing the key agreement consumes the pair, so a failed
/// handshake cannot reuse its secret.
pub struct KeyPair {
    secret: EphemeralSecret,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a new key pair from OS randomness
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Get the public key bytes
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        *self.public.as_bytes()
    }

    /// Derive the shared session key from the remote party's public key.
    ///
    /// The agreement is commutative: the remote derives the bit-identical
    /// secret from its secret key and our public key. Rejects key material
    /// that is not exactly 32 bytes or that produces a non-contributory
    /// (all-zero) shared point.
    pub fn diffie_hellman(self, their_public: &[u8]) -> CryptoResult<SessionKey> {
        let bytes: [u8; PUBLIC_KEY_SIZE] =
            their_public
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: PUBLIC_KEY_SIZE,
                    actual: their_public.len(),
                })?;

        let shared = self.secret.diffie_hellman(&PublicKey::from(bytes));
        if !shared.was_contributory() {
            return Err(CryptoError::WeakPublicKey);
        }

        SessionKey::from_shared_secret(&shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agreement_is_commutative() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        let alice_public = alice.public_key_bytes();
        let bob_public = bob.public_key_bytes();

        let alice_key = alice.diffie_hellman(&bob_public).unwrap();
        let bob_key = bob.diffie_hellman(&alice_public).unwrap();

        // Encrypt on one side, decrypt on the other: only possible if the
        // independently derived secrets are bit-identical.
        let envelope = alice_key.encrypt(&serde_json::json!({"probe": 1})).unwrap();
        let roundtrip: serde_json::Value = bob_key.decrypt(&envelope).unwrap();
        assert_eq!(roundtrip["probe"], 1);
    }

    #[test]
    fn rejects_wrong_length_public_key() {
        let pair = KeyPair::generate();
        let err = pair.diffie_hellman(&[0u8; 31]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 31
            }
        ));
    }

    #[test]
    fn rejects_all_zero_public_key() {
        let pair = KeyPair::generate();
        let err = pair.diffie_hellman(&[0u8; 32]).unwrap_err();
        assert!(matches!(err, CryptoError::WeakPublicKey));
    }
}
