//! Server configuration loader for Parley.
//!
//! Reads an optional TOML file into [`ServerConfig`], falling back to
//! defaults when the file is missing or malformed, then overlays the
//! conventional deployment environment variables.

use std::path::Path;

use secrecy::SecretString;

use parley_types::config::{RuntimeEnvironment, ServerConfig};

/// Load server configuration from `path`.
///
/// - No path, or a path that does not exist, yields [`ServerConfig::default()`].
/// - A file that fails to read or parse logs a warning and yields the default.
pub async fn load_server_config(path: Option<&Path>) -> ServerConfig {
    let Some(path) = path else {
        return ServerConfig::default();
    };

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return ServerConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return ServerConfig::default();
        }
    };

    match toml::from_str::<ServerConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            ServerConfig::default()
        }
    }
}

/// Overlay environment variables onto `config`.
///
/// `lookup` is normally `|name| std::env::var(name).ok()`. Empty values
/// count as unset. `VALKEY_URL` wins over `REDIS_URL`.
pub fn apply_env_overrides(
    mut config: ServerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ServerConfig {
    let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
    let secret = |name: &str| var(name).map(SecretString::from);

    if let Some(env) = var("ENVIRONMENT") {
        config.environment = RuntimeEnvironment::from_env_value(&env);
    }
    if let Some(origins) = var("TRUSTED_ORIGIN") {
        config.trusted_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(host) = var("HOST") {
        config.host = host;
    }
    if let Some(port) = var("PORT") {
        match port.trim_start_matches(':').parse() {
            Ok(port) => config.port = port,
            Err(err) => tracing::warn!("Ignoring PORT={port}: {err}"),
        }
    }
    if let Some(url) = var("DATABASE_URL") {
        config.database_url = url;
    }
    if let Some(url) = var("VALKEY_URL").or_else(|| var("REDIS_URL")) {
        config.redis_url = url;
    }
    if let Some(url) = var("FRONTEND_URL") {
        config.frontend_url = url;
    }
    if let Some(id) = var("GOOGLE_OAUTH_CLIENT_ID") {
        config.google.client_id = id;
    }
    if let Some(client_secret) = secret("GOOGLE_OAUTH_CLIENT_SECRET") {
        config.google.client_secret = Some(client_secret);
    }
    if let Some(url) = var("GOOGLE_OAUTH_REDIRECT_URL") {
        config.google.redirect_url = url;
    }
    if let Some(key) = secret("OPENAI_API_KEY") {
        config.providers.openai_api_key = Some(key);
    }
    if let Some(key) = secret("GEMINI_API_KEY") {
        config.providers.gemini_api_key = Some(key);
    }
    if let Some(key) = secret("ANTHROPIC_API_KEY") {
        config.providers.anthropic_api_key = Some(key);
    }

    config
}
