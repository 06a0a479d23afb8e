//! Keyed rate limiter with a periodic idle sweep.
//!
//! One [`TokenBucket`] per client key (the client's IP address). A single
//! lock guards the map; it is held only for the lookup-and-spend, never
//! across the downstream request. A background task started with
//! [`RateLimiter::start`] evicts clients idle for longer than
//! `idle_timeout` and exits when its cancellation token fires.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use parley_types::config::RateLimitSettings;

use super::bucket::TokenBucket;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub rate_per_second: f64,
    pub burst: u32,
    pub sweep_interval: Duration,
    pub idle_timeout: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::from(&RateLimitSettings::default())
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        let sweep_interval = Duration::from_secs(settings.sweep_interval_secs.max(1));
        Self {
            rate_per_second: settings.rate_per_second,
            burst: settings.burst,
            sweep_interval,
            idle_timeout: sweep_interval * 3,
        }
    }
}

struct ClientEntry {
    bucket: TokenBucket,
    last_seen: Instant,
}

pub struct RateLimiter {
    config: RateLimitConfig,
    clients: Mutex<HashMap<String, ClientEntry>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or reject one request from `key`.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock();
        let entry = clients.entry(key.to_string()).or_insert_with(|| ClientEntry {
            bucket: TokenBucket::new(self.config.burst, self.config.rate_per_second, now),
            last_seen: now,
        });
        entry.last_seen = now;
        entry.bucket.try_acquire(now)
    }

    /// Drop clients not seen within `idle_timeout`. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let idle_timeout = self.config.idle_timeout;
        let mut clients = self.clients.lock();
        let before = clients.len();
        clients.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= idle_timeout);
        before - clients.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }

    /// Spawn the periodic sweep. Cancel `shutdown` to stop it.
    pub fn start(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        let period = self.config.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("rate limiter sweep stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = limiter.sweep();
                        if removed > 0 {
                            tracing::debug!(removed, "evicted idle rate limit clients");
                        }
                    }
                }
            }
        })
    }
}
