use ed25519_dalek::{Keypair, Signer, Verifier};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const PUBLIC_KEY_BYTE_COUNT: usize = 32;

/// Failures of the signature scheme itself, as opposed to a signature
/// that simply doesn't verify (which is a normal boolean outcome).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    SigningFailed(String),
    MalformedPublicKey(String),
}

impl Display for CryptoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoError::SigningFailed(reason) => write!(f, "Signing failed: {}", reason),
            CryptoError::MalformedPublicKey(reason) => {
                write!(f, "Malformed public key encoding: {}", reason)
            }
        }
    }
}

impl Error for CryptoError {}

/// An Ed25519 public key that owns transaction outputs.
///
/// Its 32-byte encoding is part of the signable and raw transaction
/// payloads, so the encoding must stay byte-for-byte stable across
/// implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(ed25519_dalek::PublicKey);

impl PublicKey {
    /// Canonical encoding used inside signable and raw payloads.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_BYTE_COUNT] {
        self.0.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key = ed25519_dalek::PublicKey::from_bytes(bytes)
            .map_err(|e| CryptoError::MalformedPublicKey(e.to_string()))?;
        Ok(Self(key))
    }

    /// Verifies `signature` over `message` against this key.
    /// Returns false on a mismatch or on malformed signature bytes;
    /// neither is an error condition.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match ed25519_dalek::Signature::try_from(signature) {
            Ok(signature) => self.0.verify(message, &signature).is_ok(),
            Err(_) => false,
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// An Ed25519 key pair used to sign transaction inputs.
pub struct KeyPair(Keypair);

impl KeyPair {
    pub fn generate() -> Self {
        let mut csprng = OsRng {};
        Self(Keypair::generate(&mut csprng))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.public)
    }

    /// Signs `message` and returns the signature bytes.
    /// Ed25519 signing is deterministic for a given key and message.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let signature = self
            .0
            .try_sign(message)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(signature.to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify() {
        let key_pair = KeyPair::generate();
        let message = b"pay 10.5 to bob";
        let signature = key_pair.sign(message).unwrap();
        assert!(key_pair.public_key().verify(message, &signature));
    }

    #[test]
    fn verify_fails_for_wrong_key() {
        let key_pair = KeyPair::generate();
        let other = KeyPair::generate();
        let message = b"pay 10.5 to bob";
        let signature = key_pair.sign(message).unwrap();
        assert!(!other.public_key().verify(message, &signature));
    }

    #[test]
    fn verify_fails_for_tampered_message() {
        let key_pair = KeyPair::generate();
        let signature = key_pair.sign(b"pay 10.5 to bob").unwrap();
        assert!(!key_pair.public_key().verify(b"pay 99.0 to bob", &signature));
    }

    #[test]
    fn verify_is_false_for_garbage_signature_bytes() {
        let key_pair = KeyPair::generate();
        assert!(!key_pair.public_key().verify(b"message", b"not a signature"));
    }

    #[test]
    fn signing_is_deterministic() {
        let key_pair = KeyPair::generate();
        let first = key_pair.sign(b"same message").unwrap();
        let second = key_pair.sign(b"same message").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn public_key_encoding_round_trip() {
        let key_pair = KeyPair::generate();
        let encoded = key_pair.public_key().to_bytes();
        assert_eq!(encoded.len(), PUBLIC_KEY_BYTE_COUNT);
        let decoded = PublicKey::from_bytes(&encoded).unwrap();
        assert_eq!(decoded, key_pair.public_key());
    }

    #[test]
    fn malformed_public_key_is_an_error() {
        let result = PublicKey::from_bytes(&[1, 2, 3]);
        assert!(matches!(result, Err(CryptoError::MalformedPublicKey(_))));
    }
}
