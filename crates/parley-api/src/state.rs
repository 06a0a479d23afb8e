//! Application state wiring all services together.
//!
//! Services are generic over their ports; AppState pins them to the
//! concrete infra implementations.

use std::sync::Arc;
use std::time::Duration;

use parley_core::chat::ChatService;
use parley_core::llm::ProviderRegistry;
use parley_core::ratelimit::{RateLimitConfig, RateLimiter};
use parley_core::session::SessionService;
use parley_core::storage::BoxKvStore;
use parley_core::user::UserService;
use parley_infra::kv::{MemoryKvStore, RedisKvStore};
use parley_infra::llm::build_registry;
use parley_infra::oauth::GoogleOAuthClient;
use parley_infra::sqlite::chat::SqliteChatRepository;
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::user::SqliteUserRepository;
use parley_types::config::{KvBackend, ServerConfig};

/// Maximum Redis connections per process.
const REDIS_POOL_MAX: usize = 16;

pub type ConcreteSessionService = SessionService<BoxKvStore>;

pub type ConcreteUserService = UserService<SqliteUserRepository, BoxKvStore, GoogleOAuthClient>;

pub type ConcreteChatService = ChatService<SqliteChatRepository>;

/// Request-pipeline settings read on every request.
pub struct HttpSettings {
    pub trusted_origins: Vec<String>,
    /// Rate limiting runs only in production.
    pub rate_limit_enabled: bool,
    pub session_ttl: Duration,
    pub frontend_url: String,
}

impl HttpSettings {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            trusted_origins: config.trusted_origins.clone(),
            rate_limit_enabled: config.environment.is_production(),
            session_ttl: config.session_ttl(),
            frontend_url: config.frontend_url.clone(),
        }
    }
}

/// Shared application state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<ConcreteSessionService>,
    pub users: Arc<ConcreteUserService>,
    pub chats: Arc<ConcreteChatService>,
    pub limiter: Arc<RateLimiter>,
    pub settings: Arc<HttpSettings>,
}

impl AppState {
    /// Connect to the stores and build every service from `config`.
    pub async fn init(config: &ServerConfig) -> anyhow::Result<(Self, DatabasePool)> {
        let pool = DatabasePool::new(&config.database_url).await?;

        let store = match config.kv_backend {
            KvBackend::Redis => BoxKvStore::new(RedisKvStore::new(&config.redis_url, REDIS_POOL_MAX)?),
            KvBackend::Memory => {
                tracing::warn!("using the in-process key-value store; sessions will not survive a restart");
                BoxKvStore::new(MemoryKvStore::new())
            }
        };

        let providers = build_registry(config)?;
        let identity = GoogleOAuthClient::new(&config.google)?;

        let state = Self::from_parts(pool.clone(), store, providers, identity, config);
        Ok((state, pool))
    }

    /// Assemble the state from already-built adapters.
    pub fn from_parts(
        pool: DatabasePool,
        store: BoxKvStore,
        providers: ProviderRegistry,
        identity: GoogleOAuthClient,
        config: &ServerConfig,
    ) -> Self {
        let sessions = SessionService::new(store.clone());
        let users = UserService::new(
            SqliteUserRepository::new(pool.clone()),
            store,
            identity,
            config.state_token_ttl(),
        );
        let chats = ChatService::new(
            SqliteChatRepository::new(pool),
            providers,
            config.provider_timeout(),
        );
        let limiter = RateLimiter::new(RateLimitConfig::from(&config.rate_limit));

        Self {
            sessions: Arc::new(sessions),
            users: Arc::new(users),
            chats: Arc::new(chats),
            limiter: Arc::new(limiter),
            settings: Arc::new(HttpSettings::from_config(config)),
        }
    }
}
