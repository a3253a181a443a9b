//! Per-profile record field encryption.
//!
//! Free-text comment and note bodies are stored sealed under a key held on
//! the owning profile. The key is generated when the profile first writes an
//! encrypted field and never rotates; records written before a key exists
//! cannot be read back, which the services surface as an action-required
//! result rather than an error.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{Key, KeySizeUser, XChaCha20Poly1305, XNonce};

use crate::error::{ServiceError, ServiceResult};

const NONCE_LEN: usize = 24;

/// Generates a fresh profile encryption key, base64-encoded for storage.
#[must_use]
pub fn generate_key() -> String {
    let key = XChaCha20Poly1305::generate_key(&mut OsRng);
    STANDARD.encode(key)
}

pub struct RecordCipher {
    cipher: XChaCha20Poly1305,
}

impl RecordCipher {
    /// ## Summary
    /// Builds a cipher from a profile's stored base64 key.
    ///
    /// ## Errors
    /// Returns `CryptoError` when the stored key is malformed.
    pub fn from_stored_key(key: &str) -> ServiceResult<Self> {
        let key = STANDARD
            .decode(key)
            .map_err(|_| ServiceError::CryptoError("Profile key is not base64".to_string()))?;
        if key.len() != XChaCha20Poly1305::key_size() {
            return Err(ServiceError::CryptoError(
                "Profile key has the wrong length".to_string(),
            ));
        }
        Ok(Self {
            cipher: XChaCha20Poly1305::new(Key::from_slice(&key)),
        })
    }

    /// ## Summary
    /// Seals a record field for storage.
    ///
    /// ## Errors
    /// Returns `CryptoError` if encryption fails.
    pub fn seal(&self, plaintext: &str) -> ServiceResult<String> {
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| ServiceError::CryptoError(format!("Failed to seal record: {e}")))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    /// ## Summary
    /// Opens a stored record field.
    ///
    /// ## Errors
    /// Returns `CryptoError` for malformed or tampered stored values.
    pub fn open(&self, stored: &str) -> ServiceResult<String> {
        let sealed = STANDARD
            .decode(stored)
            .map_err(|_| ServiceError::CryptoError("Stored record is not base64".to_string()))?;
        if sealed.len() < NONCE_LEN {
            return Err(ServiceError::CryptoError(
                "Stored record is truncated".to_string(),
            ));
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| ServiceError::CryptoError("Failed to open stored record".to_string()))?;
        String::from_utf8(plaintext)
            .map_err(|_| ServiceError::CryptoError("Stored record is not UTF-8".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_seals_and_opens() {
        let cipher = RecordCipher::from_stored_key(&generate_key()).expect("fresh key is valid");
        let sealed = cipher.seal("went for a walk today").expect("seal should succeed");
        assert_ne!(sealed, "went for a walk today");
        assert_eq!(
            cipher.open(&sealed).expect("open should succeed"),
            "went for a walk today"
        );
    }

    #[test]
    fn keys_are_unique() {
        assert_ne!(generate_key(), generate_key());
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = RecordCipher::from_stored_key(&generate_key())
            .expect("fresh key is valid")
            .seal("secret")
            .expect("seal should succeed");
        let other = RecordCipher::from_stored_key(&generate_key()).expect("fresh key is valid");
        assert!(other.open(&sealed).is_err());
    }

    #[test]
    fn malformed_key_is_rejected() {
        assert!(RecordCipher::from_stored_key("short").is_err());
        assert!(RecordCipher::from_stored_key(&STANDARD.encode([0u8; 7])).is_err());
    }
}
