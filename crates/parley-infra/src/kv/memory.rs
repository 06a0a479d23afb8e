//! In-process `KvStore` with lazy expiry.
//!
//! Entries past their deadline are treated as absent and removed on access.
//! Nothing survives a restart, so this backend is for development only.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use parley_core::storage::KvStore;
use parley_types::error::RepositoryError;

#[derive(Default)]
pub struct MemoryKvStore {
    entries: DashMap<Vec<u8>, (String, Instant)>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_value(&self, key: &[u8]) -> Option<String> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            let (value, deadline) = entry.value();
            if *deadline > now {
                return Some(value.clone());
            }
        }
        self.sweep(key, now);
        None
    }

    /// Drop `key` only if it is still expired at `now`. A writer that
    /// refreshed the key after the caller's read keeps its value.
    fn sweep(&self, key: &[u8], now: Instant) {
        self.entries
            .remove_if(key, |_, (_, deadline)| *deadline <= now);
    }
}

impl KvStore for MemoryKvStore {
    async fn set_with_ttl(
        &self,
        key: &[u8],
        value: &str,
        ttl: Duration,
    ) -> Result<(), RepositoryError> {
        self.entries
            .insert(key.to_vec(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn get(&self, key: &[u8]) -> Result<Option<String>, RepositoryError> {
        Ok(self.live_value(key))
    }

    async fn delete(&self, key: &[u8]) -> Result<bool, RepositoryError> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, (_, deadline))| deadline > now))
    }
}
