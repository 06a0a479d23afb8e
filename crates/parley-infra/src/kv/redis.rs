//! Redis-backed `KvStore` over a deadpool connection pool.

use std::time::Duration;

use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};
use parley_core::storage::KvStore;
use parley_types::error::RepositoryError;

/// Upper bound on one round trip, including pool checkout.
const KV_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct RedisKvStore {
    pool: Pool,
}

impl RedisKvStore {
    /// Build the pool. No connection is opened until first use.
    pub fn new(url: &str, pool_max: usize) -> Result<Self, RepositoryError> {
        let mut cfg = Config::from_url(url);
        cfg.pool = Some(PoolConfig::new(pool_max));
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(Self { pool })
    }

    async fn connection(&self) -> Result<Connection, RepositoryError> {
        self.pool.get().await.map_err(|e| {
            tracing::warn!(error = %e, "redis pool checkout failed");
            RepositoryError::Connection
        })
    }
}

fn redis_err(e: deadpool_redis::redis::RedisError) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

async fn bounded<T>(
    operation: impl std::future::Future<Output = Result<T, RepositoryError>>,
) -> Result<T, RepositoryError> {
    tokio::time::timeout(KV_TIMEOUT, operation)
        .await
        .map_err(|_| RepositoryError::Timeout)?
}

impl KvStore for RedisKvStore {
    async fn set_with_ttl(
        &self,
        key: &[u8],
        value: &str,
        ttl: Duration,
    ) -> Result<(), RepositoryError> {
        // Redis rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        bounded(async {
            let mut conn = self.connection().await?;
            conn.set_ex::<_, _, ()>(key, value, seconds)
                .await
                .map_err(redis_err)
        })
        .await
    }

    async fn get(&self, key: &[u8]) -> Result<Option<String>, RepositoryError> {
        bounded(async {
            let mut conn = self.connection().await?;
            conn.get::<_, Option<String>>(key).await.map_err(redis_err)
        })
        .await
    }

    async fn delete(&self, key: &[u8]) -> Result<bool, RepositoryError> {
        bounded(async {
            let mut conn = self.connection().await?;
            // DEL answers with the number of keys it removed.
            let removed = conn.del::<_, usize>(key).await.map_err(redis_err)?;
            Ok(removed > 0)
        })
        .await
    }
}
