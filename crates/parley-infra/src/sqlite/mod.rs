//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools. Every repository call is bounded by
//! [`STORE_TIMEOUT`].

use std::future::Future;
use std::time::Duration;

use parley_types::error::RepositoryError;

pub mod chat;
pub mod pool;
pub mod user;

/// Upper bound on a single repository operation, including pool acquisition.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn query_err(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut => RepositoryError::Timeout,
        sqlx::Error::PoolClosed => RepositoryError::Connection,
        other => RepositoryError::Query(other.to_string()),
    }
}

pub(crate) async fn bounded<T>(
    operation: impl Future<Output = Result<T, RepositoryError>>,
) -> Result<T, RepositoryError> {
    tokio::time::timeout(STORE_TIMEOUT, operation)
        .await
        .map_err(|_| RepositoryError::Timeout)?
}
