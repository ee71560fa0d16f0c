//! Token storage and management
//!
//! A typed layer over a keyed string store. The store trait keeps the
//! persistence medium swappable (config file, in-memory, OS keychain); the
//! typed layer owns the serialization and the expiry bookkeeping.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::UserProfile;

/// Fixed storage keys. Tokens, expiry and user are JSON-encoded strings.
pub const TOKENS_KEY: &str = "drupal_auth_tokens";
pub const EXPIRY_KEY: &str = "drupal_token_expiry";
pub const USER_KEY: &str = "drupal_user_data";
pub const COOKIE_KEY: &str = "drupal_session_cookie";

/// Session token record as issued by the backend on login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Keyed string storage for session state.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store for tests and embedders that manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Typed access to tokens, expiry timestamp, cached user and session cookie.
#[derive(Debug)]
pub struct TokenStore<S> {
    store: S,
}

impl<S: SessionStore> TokenStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist a token record. The absolute expiry timestamp is recomputed
    /// from `expires_in` on every store; stored expiry is never carried over.
    pub fn store_tokens(&mut self, tokens: &AuthTokens) -> Result<()> {
        self.store.set(TOKENS_KEY, serde_json::to_string(tokens)?)?;
        let expiry = now_ms() + tokens.expires_in * 1000;
        self.store.set(EXPIRY_KEY, expiry.to_string())
    }

    /// Stored token record, or None when absent or unreadable.
    pub fn read_tokens(&self) -> Option<AuthTokens> {
        let raw = self.store.get(TOKENS_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn store_user(&mut self, user: &UserProfile) -> Result<()> {
        self.store.set(USER_KEY, serde_json::to_string(user)?)
    }

    pub fn read_user(&self) -> Option<UserProfile> {
        let raw = self.store.get(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn store_cookie(&mut self, cookie: &str) -> Result<()> {
        self.store.set(COOKIE_KEY, cookie.to_string())
    }

    pub fn read_cookie(&self) -> Option<String> {
        self.store.get(COOKIE_KEY)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(TOKENS_KEY)?;
        self.store.remove(EXPIRY_KEY)?;
        self.store.remove(USER_KEY)?;
        self.store.remove(COOKIE_KEY)
    }

    /// True when the stored token has reached its expiry timestamp, or when
    /// no expiry record exists (fail-safe: re-authenticate).
    pub fn is_expired(&self) -> bool {
        match self
            .store
            .get(EXPIRY_KEY)
            .and_then(|raw| raw.parse::<u64>().ok())
        {
            Some(expiry) => expired(expiry, now_ms()),
            None => true,
        }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

fn expired(expiry_ms: u64, now_ms: u64) -> bool {
    now_ms >= expiry_ms
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
