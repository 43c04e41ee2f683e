//! Ed25519 public keys and signature verification.
//!
//! A key can be supplied as 32 raw bytes, a 64-character hex string, a
//! base64 or base64url string of the raw bytes, or a PEM / base64 DER
//! SubjectPublicKeyInfo document.

use crate::error::{LicenseError, LicenseResult};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use ed25519_dalek::pkcs8::DecodePublicKey;
use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Length in bytes of a raw token signature.
pub const SIGNATURE_LEN: usize = SIGNATURE_LENGTH;

/// A verify-only Ed25519 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Builds a key from its raw 32-byte encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice has the wrong length or is not a valid
    /// curve point.
    pub fn from_bytes(bytes: &[u8]) -> LicenseResult<Self> {
        let raw: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            LicenseError::InvalidPublicKey(format!(
                "expected {PUBLIC_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        VerifyingKey::from_bytes(&raw)
            .map(Self)
            .map_err(|e| LicenseError::InvalidPublicKey(e.to_string()))
    }

    /// Parses a textual key, sniffing PEM, hex and base64 encodings in that
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error if no encoding yields a valid Ed25519 key.
    pub fn parse(input: &str) -> LicenseResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(LicenseError::InvalidPublicKey("empty key".to_string()));
        }

        if input.starts_with("-----BEGIN") {
            return VerifyingKey::from_public_key_pem(input)
                .map(Self)
                .map_err(|e| LicenseError::InvalidPublicKey(format!("invalid PEM key: {e}")));
        }

        if input.len() == PUBLIC_KEY_LENGTH * 2 && input.bytes().all(|b| b.is_ascii_hexdigit()) {
            let bytes = hex::decode(input)
                .map_err(|e| LicenseError::InvalidPublicKey(format!("invalid hex key: {e}")))?;
            return Self::from_bytes(&bytes);
        }

        let bytes = decode_base64_any(input).ok_or_else(|| {
            LicenseError::InvalidPublicKey("key is not valid hex, base64 or PEM".to_string())
        })?;

        if bytes.len() == PUBLIC_KEY_LENGTH {
            Self::from_bytes(&bytes)
        } else {
            VerifyingKey::from_public_key_der(&bytes)
                .map(Self)
                .map_err(|e| LicenseError::InvalidPublicKey(format!("invalid DER key: {e}")))
        }
    }

    /// Returns the raw 32-byte public key.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.to_bytes()
    }

    /// Verifies `signature` over `message`.
    ///
    /// Every failure, including a malformed signature, collapses into
    /// `false` so callers cannot tell structural and cryptographic rejects
    /// apart.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        self.0.verify(message, &signature).is_ok()
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key)
    }
}

fn decode_base64_any(input: &str) -> Option<Vec<u8>> {
    STANDARD
        .decode(input)
        .or_else(|_| STANDARD_NO_PAD.decode(input))
        .ok()
        .or_else(|| crate::codec::decode(input).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    #[test]
    fn parse_hex_and_base64_agree() {
        let raw = signing_key().verifying_key().to_bytes();
        let from_hex = PublicKey::parse(&hex::encode(raw)).unwrap();
        let from_std = PublicKey::parse(&STANDARD.encode(raw)).unwrap();
        let from_url = PublicKey::parse(&crate::codec::encode(raw)).unwrap();
        let from_raw = PublicKey::from_bytes(&raw).unwrap();
        assert_eq!(from_hex, from_raw);
        assert_eq!(from_std, from_raw);
        assert_eq!(from_url, from_raw);
    }

    #[test]
    fn parse_trims_whitespace() {
        let raw = signing_key().verifying_key().to_bytes();
        let key = PublicKey::parse(&format!("  {}\n", hex::encode(raw))).unwrap();
        assert_eq!(key.to_bytes(), raw);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(PublicKey::parse("").is_err());
        assert!(PublicKey::parse("not a key!").is_err());
        assert!(PublicKey::parse(&STANDARD.encode([1u8; 16])).is_err());
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        assert!(matches!(
            PublicKey::from_bytes(&[0u8; 31]),
            Err(LicenseError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn verify_accepts_valid_and_rejects_tampered() {
        let sk = signing_key();
        let key = PublicKey::from(sk.verifying_key());
        let sig = sk.sign(b"header.payload").to_bytes();
        assert!(key.verify(b"header.payload", &sig));
        assert!(!key.verify(b"header.payloaD", &sig));
    }

    #[test]
    fn verify_folds_malformed_signature() {
        let key = PublicKey::from(signing_key().verifying_key());
        assert!(!key.verify(b"msg", &[0u8; 10]));
        assert!(!key.verify(b"msg", &[]));
    }
}
