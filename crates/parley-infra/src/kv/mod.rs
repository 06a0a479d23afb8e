//! Expiring key-value stores: Redis for deployments, an in-process map for
//! local development and tests.

pub mod memory;
pub mod redis;

pub use memory::MemoryKvStore;
pub use redis::RedisKvStore;
