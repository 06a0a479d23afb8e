//! Per-client token bucket rate limiting.

pub mod bucket;
pub mod limiter;

pub use bucket::TokenBucket;
pub use limiter::{RateLimitConfig, RateLimiter};
