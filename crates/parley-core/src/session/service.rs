//! Session issuance and validation.
//!
//! A session token is 16 random bytes rendered as 26 characters of unpadded
//! base32. The store is keyed by the raw SHA-256 digest of the token, so a
//! leaked store never yields usable tokens. The stored value is the user
//! record as JSON; expiry is delegated to the store's per-key TTL.

use std::time::Duration;

use sha2::{Digest, Sha256};

use parley_types::error::{FieldErrors, SessionError};
use parley_types::session::{SESSION_TOKEN_LENGTH, Session};
use parley_types::user::User;

use super::token;
use crate::storage::KvStore;

/// SHA-256 digest of a plaintext token. This is the store key.
pub fn hash_token(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Shape check performed before any store lookup.
pub fn validate_token_plaintext(token: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.check(!token.is_empty(), "token", "must be provided");
    errors.check(
        token.len() == SESSION_TOKEN_LENGTH,
        "token",
        "must be 26 bytes long",
    );
    errors.into_result()
}

pub struct SessionService<K> {
    store: K,
}

impl<K: KvStore> SessionService<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Mint a token for `user` and persist its hash for `ttl`.
    pub async fn issue(&self, user: &User, ttl: Duration) -> Result<Session, SessionError> {
        let plaintext = token::session_token().map_err(SessionError::Random)?;
        let hash = hash_token(&plaintext);
        let record =
            serde_json::to_string(user).map_err(|e| SessionError::Corrupt(e.to_string()))?;

        self.store.set_with_ttl(&hash, &record, ttl).await?;
        tracing::debug!(user_id = %user.id, ttl_secs = ttl.as_secs(), "session issued");

        Ok(Session {
            user_id: user.id.clone(),
            plaintext,
            hash,
            ttl,
        })
    }

    /// Resolve a presented token to its user.
    ///
    /// Malformed tokens fail with `InvalidToken` without touching the store;
    /// unknown or expired ones fail with `NotFound`.
    pub async fn validate(&self, token: &str) -> Result<User, SessionError> {
        validate_token_plaintext(token).map_err(SessionError::InvalidToken)?;

        let record = self
            .store
            .get(&hash_token(token))
            .await?
            .filter(|record| !record.is_empty())
            .ok_or(SessionError::NotFound)?;

        serde_json::from_str(&record).map_err(|e| SessionError::Corrupt(e.to_string()))
    }
}
