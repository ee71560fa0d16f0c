//! Session state machine
//!
//! Keeps local session state (tokens, cached profile, cookie) consistent with
//! the remote authoritative session. Background failures silently demote to
//! anonymous; explicit login failures propagate to the caller.

use anyhow::Result;

use super::session::{self, RegisterData};
use super::tokens::{SessionStore, TokenStore};
use crate::api::client::StorefrontClient;
use crate::config::Config;
use crate::models::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Authenticated,
    Anonymous,
}

pub struct SessionManager<S: SessionStore> {
    store: TokenStore<S>,
    client: StorefrontClient,
    state: SessionState,
    user: Option<UserProfile>,
}

impl SessionManager<Config> {
    /// Load config, hydrate the session from storage and refresh if needed.
    pub async fn connect(base_override: Option<&str>) -> Result<Self> {
        let config = Config::load()?;
        let base_url = config.resolve_base_url(base_override)?;
        let mut manager = Self::new(config, StorefrontClient::new(base_url));
        manager.initialize().await;
        Ok(manager)
    }
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S, client: StorefrontClient) -> Self {
        Self {
            store: TokenStore::new(store),
            client,
            state: SessionState::Uninitialized,
            user: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn client(&self) -> &StorefrontClient {
        &self.client
    }

    pub fn store(&self) -> &TokenStore<S> {
        &self.store
    }

    /// Startup hydration: refresh the token if needed, then resolve the user,
    /// preferring the cached profile to avoid a remote round trip (accepted
    /// staleness trade-off). Any failure lands in the anonymous state.
    pub async fn initialize(&mut self) {
        self.state = SessionState::Loading;
        self.hydrate_client();

        if self.refresh_token_if_needed().await.is_none() {
            self.state = SessionState::Anonymous;
            return;
        }

        if let Some(user) = self.store.read_user() {
            self.user = Some(user);
            self.state = SessionState::Authenticated;
            return;
        }

        match session::current_user(&self.client).await {
            Ok(user) => {
                if let Err(e) = self.store.store_user(&user) {
                    tracing::warn!("Failed to cache user profile: {:#}", e);
                }
                self.user = Some(user);
                self.state = SessionState::Authenticated;
            }
            Err(e) => {
                tracing::warn!("Failed to resolve current user: {:#}", e);
                self.demote();
            }
        }
    }

    /// Returns a valid access token, refreshing it first when the stored one
    /// has expired. With no stored tokens this returns None without touching
    /// the network. Refresh failures demote to anonymous silently.
    pub async fn refresh_token_if_needed(&mut self) -> Option<String> {
        let tokens = self.store.read_tokens()?;

        if !self.store.is_expired() {
            return Some(tokens.access_token);
        }

        let Some(refresh_token) = tokens.refresh_token else {
            // expired with nothing to refresh against
            self.demote();
            return None;
        };

        match session::refresh_tokens(&self.client, &refresh_token).await {
            Ok(new_tokens) => {
                if let Err(e) = self.store.store_tokens(&new_tokens) {
                    tracing::warn!("Failed to persist refreshed tokens: {:#}", e);
                    self.demote();
                    return None;
                }
                self.client.set_csrf(Some(new_tokens.access_token.clone()));
                Some(new_tokens.access_token)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {:#}", e);
                self.demote();
                None
            }
        }
    }

    /// Explicit login. Errors propagate to the caller for display; the
    /// session stays anonymous on failure.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.state = SessionState::Loading;
        let result = self.do_login(username, password).await;
        if result.is_err() {
            self.state = SessionState::Anonymous;
        }
        result
    }

    async fn do_login(&mut self, username: &str, password: &str) -> Result<()> {
        let csrf = session::fetch_csrf_token(&self.client).await?;
        self.client.set_csrf(Some(csrf));

        let outcome = session::login(&self.client, username, password).await?;
        self.store.store_tokens(&outcome.tokens)?;
        self.client.set_csrf(Some(outcome.tokens.access_token.clone()));
        if let Some(cookie) = outcome.cookie {
            self.store.store_cookie(&cookie)?;
            self.client.set_cookie(Some(cookie));
        }

        // Prefer the profile embedded in the login response (saves a round
        // trip); fall back to remote resolution.
        let user = match outcome.user {
            Some(user) => user,
            None => session::current_user(&self.client).await?,
        };
        self.store.store_user(&user)?;
        self.user = Some(user);
        self.state = SessionState::Authenticated;
        Ok(())
    }

    /// Best-effort remote session destruction; local state is cleared
    /// regardless of the outcome.
    pub async fn logout(&mut self) {
        if self.store.read_tokens().is_some() {
            if let Err(e) = session::logout(&self.client).await {
                tracing::warn!("Remote logout failed (ignored): {:#}", e);
            }
        }
        self.demote();
    }

    pub async fn register(&self, data: &RegisterData) -> Result<UserProfile> {
        session::register(&self.client, data).await
    }

    /// Re-run the startup hydration. The cached profile still wins when
    /// present.
    pub async fn refresh_user(&mut self) {
        self.initialize().await;
    }

    fn hydrate_client(&mut self) {
        self.client.set_cookie(self.store.read_cookie());
        self.client
            .set_csrf(self.store.read_tokens().map(|t| t.access_token));
    }

    fn demote(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear session storage: {:#}", e);
        }
        self.client.clear_session();
        self.user = None;
        self.state = SessionState::Anonymous;
    }
}
