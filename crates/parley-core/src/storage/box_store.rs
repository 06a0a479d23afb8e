//! BoxKvStore -- object-safe dynamic dispatch wrapper for KvStore.
//!
//! Same blanket-impl pattern as `BoxLlmProvider`: an object-safe
//! `KvStoreDyn` with boxed futures, implemented for every `KvStore`, behind
//! a cheap-to-clone handle. Lets the server pick Redis or the in-process
//! store at startup.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parley_types::error::RepositoryError;

use super::kv_store::KvStore;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Object-safe version of [`KvStore`] with boxed futures.
pub trait KvStoreDyn: Send + Sync {
    fn set_with_ttl_boxed<'a>(
        &'a self,
        key: &'a [u8],
        value: &'a str,
        ttl: Duration,
    ) -> BoxFuture<'a, ()>;

    fn get_boxed<'a>(&'a self, key: &'a [u8]) -> BoxFuture<'a, Option<String>>;

    fn delete_boxed<'a>(&'a self, key: &'a [u8]) -> BoxFuture<'a, bool>;
}

impl<T: KvStore> KvStoreDyn for T {
    fn set_with_ttl_boxed<'a>(
        &'a self,
        key: &'a [u8],
        value: &'a str,
        ttl: Duration,
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.set_with_ttl(key, value, ttl))
    }

    fn get_boxed<'a>(&'a self, key: &'a [u8]) -> BoxFuture<'a, Option<String>> {
        Box::pin(self.get(key))
    }

    fn delete_boxed<'a>(&'a self, key: &'a [u8]) -> BoxFuture<'a, bool> {
        Box::pin(self.delete(key))
    }
}

/// Type-erased, shareable key-value store.
#[derive(Clone)]
pub struct BoxKvStore {
    inner: Arc<dyn KvStoreDyn>,
}

impl BoxKvStore {
    pub fn new<T: KvStore + 'static>(store: T) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }
}

impl KvStore for BoxKvStore {
    async fn set_with_ttl(
        &self,
        key: &[u8],
        value: &str,
        ttl: Duration,
    ) -> Result<(), RepositoryError> {
        self.inner.set_with_ttl_boxed(key, value, ttl).await
    }

    async fn get(&self, key: &[u8]) -> Result<Option<String>, RepositoryError> {
        self.inner.get_boxed(key).await
    }

    async fn delete(&self, key: &[u8]) -> Result<bool, RepositoryError> {
        self.inner.delete_boxed(key).await
    }
}
