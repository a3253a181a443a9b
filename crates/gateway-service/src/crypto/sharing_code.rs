//! Delegation sharing codes.
//!
//! The invite flow hands the delegate a short numeric code out of band; only
//! its Argon2id hash is persisted, so a database leak does not expose open
//! invites.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use rand::Rng;

use crate::error::{ServiceError, ServiceResult};

const CODE_DIGITS: u32 = 6;

/// Generates a fresh numeric sharing code, zero-padded to six digits.
#[must_use]
pub fn generate_sharing_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..10u32.pow(CODE_DIGITS));
    format!("{code:06}")
}

/// ## Summary
/// Hashes a sharing code using Argon2id with a random salt.
///
/// ## Errors
/// Returns an error if hashing fails.
pub fn hash_sharing_code(code: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(code.as_bytes(), &salt)
        .map_err(|e| ServiceError::CryptoError(format!("Failed to hash sharing code: {e}")))?;

    Ok(hash.to_string())
}

/// ## Summary
/// Verifies a sharing code against its stored Argon2 hash.
///
/// ## Errors
/// Returns a validation error when the code does not match, or a crypto
/// error when the stored hash is malformed.
pub fn verify_sharing_code(code: &str, code_hash: &str) -> ServiceResult<()> {
    let parsed_hash = PasswordHash::new(code_hash)
        .map_err(|e| ServiceError::CryptoError(format!("Invalid sharing code hash: {e}")))?;

    Argon2::default()
        .verify_password(code.as_bytes(), &parsed_hash)
        .map_err(|err| {
            tracing::trace!("Sharing code verification failed: {}", err);
            ServiceError::ValidationError("Sharing code does not match".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..32 {
            let code = generate_sharing_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let code = generate_sharing_code();
        let hash = hash_sharing_code(&code).expect("Failed to hash sharing code");

        assert!(verify_sharing_code(&code, &hash).is_ok());
        assert!(verify_sharing_code("000000", &hash).is_err() || code == "000000");
    }

    #[test]
    fn same_code_hashes_differently() {
        let hash1 = hash_sharing_code("123456").expect("Failed to hash sharing code");
        let hash2 = hash_sharing_code("123456").expect("Failed to hash sharing code");
        assert_ne!(hash1, hash2);
        assert!(verify_sharing_code("123456", &hash1).is_ok());
        assert!(verify_sharing_code("123456", &hash2).is_ok());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(matches!(
            verify_sharing_code("123456", "not_a_phc_string"),
            Err(ServiceError::CryptoError(_))
        ));
    }
}
