//! Server configuration types for Parley.
//!
//! `ServerConfig` is read from an optional `parley.toml` and then overlaid
//! with environment variables. Every field has a default so that an empty
//! file (or no file) yields a runnable development server.

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Deployment environment. Rate limiting is only enforced in production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, RuntimeEnvironment::Production)
    }

    /// Anything other than the exact string `production` is development.
    pub fn from_env_value(value: &str) -> Self {
        if value == "production" {
            RuntimeEnvironment::Production
        } else {
            RuntimeEnvironment::Development
        }
    }
}

/// Backend for sessions and OAuth state tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KvBackend {
    #[default]
    Redis,
    /// In-process map; sessions are lost on restart. Development only.
    Memory,
}

/// Google OAuth client registration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    pub redirect_url: String,
}

/// Server-wide API keys for the shared provider instances.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProviderKeys {
    pub openai_api_key: Option<SecretString>,
    pub gemini_api_key: Option<SecretString>,
    pub anthropic_api_key: Option<SecretString>,
}

/// Token bucket parameters for the per-client rate limiter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Sustained requests per second.
    pub rate_per_second: f64,
    /// Bucket capacity.
    pub burst: u32,
    /// How often idle clients are swept, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            rate_per_second: 25.0,
            burst: 100,
            sweep_interval_secs: 60,
        }
    }
}

/// Top-level configuration for the Parley server.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: RuntimeEnvironment,
    /// Origins allowed by CORS. `"*"` trusts every origin.
    pub trusted_origins: Vec<String>,
    pub database_url: String,
    pub kv_backend: KvBackend,
    pub redis_url: String,
    pub session_ttl_days: u64,
    pub state_token_ttl_secs: u64,
    /// Where the browser is sent after login, with `?token=` appended.
    pub frontend_url: String,
    pub provider_timeout_secs: u64,
    pub rate_limit: RateLimitSettings,
    pub google: GoogleOAuthConfig,
    pub providers: ProviderKeys,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            environment: RuntimeEnvironment::Development,
            trusted_origins: Vec::new(),
            database_url: "sqlite://parley.db".to_string(),
            kv_backend: KvBackend::Redis,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            session_ttl_days: 30,
            state_token_ttl_secs: 300,
            frontend_url: "http://localhost:3000/auth".to_string(),
            provider_timeout_secs: 60,
            rate_limit: RateLimitSettings::default(),
            google: GoogleOAuthConfig::default(),
            providers: ProviderKeys::default(),
        }
    }
}

impl ServerConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_days * 24 * 60 * 60)
    }

    pub fn state_token_ttl(&self) -> Duration {
        Duration::from_secs(self.state_token_ttl_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}
