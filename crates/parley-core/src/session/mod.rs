//! Opaque bearer sessions backed by the key-value store.

pub mod service;
pub mod token;

pub use service::{SessionService, hash_token, validate_token_plaintext};
