//! Google OAuth 2.0 authorization-code client.
//!
//! Implements [`IdentityProvider`] against Google's public endpoints:
//! consent URL construction, code-for-token exchange, the OpenID userinfo
//! endpoint, and refresh-token revocation. The client secret is held in a
//! [`SecretString`] and only exposed when authenticating the exchange.

use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::warn;

use parley_core::user::IdentityProvider;
use parley_types::config::GoogleOAuthConfig;
use parley_types::error::AuthError;
use parley_types::user::{IdentityProfile, OAuthTokens};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

const SCOPES: &str = "openid email profile";

/// Every call to Google is bounded by this timeout.
const GOOGLE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Google's OAuth endpoints, configured with this deployment's client.
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    redirect_url: String,
}

impl GoogleOAuthClient {
    pub fn new(config: &GoogleOAuthConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(GOOGLE_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Upstream(format!("failed to build HTTP client: {e}")))?;

        let client_secret = config
            .client_secret
            .clone()
            .unwrap_or_else(|| SecretString::from(String::new()));

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret,
            redirect_url: config.redirect_url.clone(),
        })
    }
}

impl IdentityProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> Result<String, AuthError> {
        let url = Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
                ("access_type", "offline"),
                ("include_granted_scopes", "true"),
            ],
        )
        .map_err(|e| AuthError::Upstream(format!("invalid authorization URL: {e}")))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthTokens, AuthError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::CodeExchange(format!("HTTP {status}: {body}")));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::CodeExchange(format!("malformed token response: {e}")))?;

        Ok(OAuthTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token.filter(|token| !token.is_empty()),
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<IdentityProfile, AuthError> {
        let response = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Upstream(format!("userinfo returned HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Upstream(format!("malformed userinfo response: {e}")))
    }

    async fn revoke(&self, refresh_token: &str) -> Result<bool, AuthError> {
        let response = self
            .http
            .post(REVOKE_URL)
            .form(&[("token", refresh_token)])
            .send()
            .await
            .map_err(|e| AuthError::Upstream(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!(%status, "google revoke endpoint refused the token");
            return Ok(false);
        }
        Ok(true)
    }
}
