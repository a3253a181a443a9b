//! Cryptographic helpers.
//!
//! ## Module Organization
//!
//! - `protector`: Authenticated encryption for identifiers leaving the system
//! - `record`: Per-profile encryption of free-text record fields
//! - `sharing_code`: Delegation sharing codes (generation and hashing)

pub mod protector;
pub mod record;
pub mod sharing_code;

pub use protector::Protector;
pub use record::RecordCipher;
