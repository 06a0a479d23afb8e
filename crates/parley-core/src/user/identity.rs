//! IdentityProvider trait definition.

use parley_types::error::AuthError;
use parley_types::user::{IdentityProfile, OAuthTokens};

/// The external OAuth identity provider (Google in production).
pub trait IdentityProvider: Send + Sync {
    /// Consent URL carrying `state`, requesting offline access.
    fn authorization_url(&self, state: &str) -> Result<String, AuthError>;

    /// Trade an authorization code for tokens.
    fn exchange_code(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<OAuthTokens, AuthError>> + Send;

    /// Read the signed-in user's profile.
    fn fetch_profile(
        &self,
        access_token: &str,
    ) -> impl std::future::Future<Output = Result<IdentityProfile, AuthError>> + Send;

    /// Revoke a refresh token. `Ok(false)` when the provider refused.
    fn revoke(
        &self,
        refresh_token: &str,
    ) -> impl std::future::Future<Output = Result<bool, AuthError>> + Send;
}
