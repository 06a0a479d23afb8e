//! Session tokens issued after a successful login.

use std::time::Duration;

/// Length of a plaintext session token: 16 random bytes in unpadded
/// base32 encode to exactly 26 characters.
pub const SESSION_TOKEN_LENGTH: usize = 26;

/// A freshly issued session.
///
/// Only `hash` is ever persisted; `plaintext` is handed to the client once
/// and cannot be recovered from the store.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub plaintext: String,
    pub hash: [u8; 32],
    pub ttl: Duration,
}
