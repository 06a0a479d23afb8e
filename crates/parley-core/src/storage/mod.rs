//! Expiring key-value storage used for sessions and OAuth state tokens.

pub mod box_store;
pub mod kv_store;

pub use box_store::BoxKvStore;
pub use kv_store::KvStore;
