//! Login and account lifecycle.
//!
//! UserService drives the OAuth authorization-code flow (state token,
//! code exchange, profile fetch, user upsert) and account deletion
//! (grant revocation, then user removal). Session issuance after login is
//! left to the caller, so a crash in between can leave a user upserted
//! without a session; the next login repairs it.

use std::time::Duration;

use tracing::{info, warn};

use parley_types::error::AuthError;
use parley_types::user::User;

use super::identity::IdentityProvider;
use super::repository::UserRepository;
use crate::session::token;
use crate::storage::KvStore;

const STATE_KEY_PREFIX: &str = "oauth_state:";

fn state_key(state: &str) -> Vec<u8> {
    format!("{STATE_KEY_PREFIX}{state}").into_bytes()
}

pub struct UserService<U, K, P> {
    users: U,
    store: K,
    identity: P,
    state_ttl: Duration,
}

impl<U, K, P> UserService<U, K, P>
where
    U: UserRepository,
    K: KvStore,
    P: IdentityProvider,
{
    pub fn new(users: U, store: K, identity: P, state_ttl: Duration) -> Self {
        Self {
            users,
            store,
            identity,
            state_ttl,
        }
    }

    /// Start a login: remember a fresh state token and return the consent URL.
    pub async fn begin_login(&self) -> Result<String, AuthError> {
        let state = token::state_token().map_err(AuthError::Random)?;
        self.store
            .set_with_ttl(&state_key(&state), "", self.state_ttl)
            .await?;
        self.identity.authorization_url(&state)
    }

    /// Finish a login from the provider's callback parameters.
    ///
    /// The state token is single-use: it is consumed before the code is
    /// exchanged, so a replayed callback fails with `InvalidStateToken`.
    pub async fn complete_login(&self, state: &str, code: &str) -> Result<User, AuthError> {
        if state.is_empty() {
            return Err(AuthError::InvalidStateToken);
        }
        // Consume the token in the same step that checks it.
        if !self.store.delete(&state_key(state)).await? {
            return Err(AuthError::InvalidStateToken);
        }

        if code.is_empty() {
            return Err(AuthError::CodeExchange("missing authorization code".to_string()));
        }
        let tokens = self.identity.exchange_code(code).await?;
        let profile = self.identity.fetch_profile(&tokens.access_token).await?;
        let user = profile.into_user(tokens.refresh_token);

        self.users.upsert(&user).await?;
        info!(user_id = %user.id, "user signed in");
        Ok(user)
    }

    /// Revoke the user's grant at the provider, then delete the user.
    ///
    /// Nothing is deleted if the provider refuses the revocation.
    pub async fn delete_account(&self, user_id: &str) -> Result<(), AuthError> {
        let refresh_token = self.users.get_refresh_token(user_id).await?;

        if !self.identity.revoke(&refresh_token).await? {
            warn!(user_id, "identity provider refused grant revocation");
            return Err(AuthError::RevocationRejected);
        }

        self.users.delete(user_id).await?;
        info!(user_id, "account deleted");
        Ok(())
    }
}
