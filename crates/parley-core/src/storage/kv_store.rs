//! Key-value store trait.
//!
//! Defines the interface for the expiring key-value store that holds
//! session records and OAuth state tokens. Implementations live in
//! parley-infra.

use std::time::Duration;

use parley_types::error::RepositoryError;

/// Trait for a key-value store with per-key expiry.
///
/// Keys are raw bytes (session keys are SHA-256 digests, not text).
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Store `value` under `key`, expiring after `ttl`. Overwrites.
    fn set_with_ttl(
        &self,
        key: &[u8],
        value: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a value by key. Returns None if the key is absent or expired.
    fn get(
        &self,
        key: &[u8],
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Delete a key in one step. Returns true when a live entry was removed,
    /// false when the key was absent or already expired.
    fn delete(
        &self,
        key: &[u8],
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
