//! Identifier protector.
//!
//! Delegation invite links carry the delegation id outside the system, so
//! the raw identifier is sealed with XChaCha20-Poly1305 under a key from
//! configuration. The sealed form is url-safe base64 of `nonce || ciphertext`;
//! the random 24-byte nonce makes every protected value unique even for the
//! same identifier.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};

use crate::error::{ServiceError, ServiceResult};

const NONCE_LEN: usize = 24;

pub struct Protector {
    cipher: XChaCha20Poly1305,
}

impl Protector {
    /// ## Summary
    /// Builds a protector from a base64-encoded 32-byte key.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` when the key is not base64 or has the
    /// wrong length.
    pub fn from_base64_key(key: &str) -> ServiceResult<Self> {
        let key = STANDARD.decode(key).map_err(|_| {
            ServiceError::InvalidConfiguration("protector key is not base64".to_string())
        })?;
        if key.len() != 32 {
            return Err(ServiceError::InvalidConfiguration(
                "protector key must decode to 32 bytes".to_string(),
            ));
        }
        Ok(Self {
            cipher: XChaCha20Poly1305::new(Key::from_slice(&key)),
        })
    }

    /// ## Summary
    /// Seals a plaintext identifier into a url-safe opaque string.
    ///
    /// ## Errors
    /// Returns `CryptoError` if encryption fails.
    pub fn protect(&self, plaintext: &str) -> ServiceResult<String> {
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| ServiceError::CryptoError(format!("Failed to protect value: {e}")))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// ## Summary
    /// Opens a protected value back into the original identifier.
    ///
    /// ## Errors
    /// Returns `CryptoError` for malformed input or failed authentication;
    /// the reason is not distinguished to the caller.
    pub fn unprotect(&self, protected: &str) -> ServiceResult<String> {
        let sealed = URL_SAFE_NO_PAD
            .decode(protected)
            .map_err(|_| ServiceError::CryptoError("Protected value is not base64".to_string()))?;
        if sealed.len() < NONCE_LEN {
            return Err(ServiceError::CryptoError(
                "Protected value is truncated".to_string(),
            ));
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| ServiceError::CryptoError("Failed to unprotect value".to_string()))?;
        String::from_utf8(plaintext)
            .map_err(|_| ServiceError::CryptoError("Unprotected value is not UTF-8".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protector() -> Protector {
        Protector::from_base64_key(&STANDARD.encode([7u8; 32])).expect("valid key")
    }

    #[test]
    fn protect_then_unprotect_round_trips() {
        let p = protector();
        let sealed = p.protect("delegation-id-42").expect("protect should succeed");
        assert_eq!(
            p.unprotect(&sealed).expect("unprotect should succeed"),
            "delegation-id-42"
        );
    }

    #[test]
    fn protecting_twice_differs() {
        let p = protector();
        let a = p.protect("same").expect("protect should succeed");
        let b = p.protect("same").expect("protect should succeed");
        assert_ne!(a, b);
    }

    #[test]
    fn tampered_value_fails_to_open() {
        let p = protector();
        let sealed = p.protect("delegation-id-42").expect("protect should succeed");
        let mut bytes = URL_SAFE_NO_PAD.decode(&sealed).expect("valid base64");
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(bytes);
        assert!(p.unprotect(&tampered).is_err());
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let sealed = protector().protect("x").expect("protect should succeed");
        let other = Protector::from_base64_key(&STANDARD.encode([9u8; 32])).expect("valid key");
        assert!(other.unprotect(&sealed).is_err());
    }

    #[test]
    fn bad_keys_are_rejected() {
        assert!(Protector::from_base64_key("!!!").is_err());
        assert!(Protector::from_base64_key(&STANDARD.encode([1u8; 16])).is_err());
    }
}
