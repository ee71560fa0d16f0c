//! Authentication module for the storefront backend
//!
//! The backend uses cookie sessions guarded by CSRF tokens. This module owns
//! local persistence of the session material (tokens, expiry, cached profile,
//! cookie), the session state machine, and the CLI-facing commands.

pub mod manager;
pub mod session;
pub mod tokens;

pub use manager::{SessionManager, SessionState};
pub use session::RegisterData;
pub use tokens::{AuthTokens, MemoryStore, SessionStore, TokenStore};

use anyhow::Result;

use crate::config::Config;

/// Log in with username and password.
pub async fn login(base: Option<&str>, username: &str, password: &str) -> Result<()> {
    let mut manager = SessionManager::connect(base).await?;
    manager.login(username, password).await?;
    let name = manager
        .user()
        .map(|u| u.name.clone())
        .unwrap_or_else(|| username.to_string());
    println!("Logged in as {}.", name);
    Ok(())
}

/// Log out: best-effort remote destruction, then clear local state.
pub async fn logout(base: Option<&str>) -> Result<()> {
    let mut manager = SessionManager::connect(base).await?;
    manager.logout().await;
    println!("Logged out.");
    Ok(())
}

/// Register a new account.
pub async fn register(base: Option<&str>, data: &RegisterData) -> Result<()> {
    let manager = SessionManager::connect(base).await?;
    let user = manager.register(data).await?;
    println!("Account {} created (uid {}).", user.name, user.uid);
    println!("Log in with 'storefront-cli login' to continue.");
    Ok(())
}

/// Display local session status without touching the network.
pub async fn status(base: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let store: TokenStore<Config> = TokenStore::new(config);

    match store.read_tokens() {
        Some(tokens) if !store.is_expired() => {
            println!("Token:       valid ({})", tokens.token_type);
        }
        Some(_) => {
            println!("Token:       expired");
        }
        None => {
            println!("Token:       none");
        }
    }

    match store.read_tokens().and_then(|t| t.refresh_token) {
        Some(_) => println!("Refresh tok: present"),
        None => println!("Refresh tok: none"),
    }

    match store.read_cookie() {
        Some(_) => println!("Cookie:      present"),
        None => println!("Cookie:      none"),
    }

    match store.read_user() {
        Some(user) => println!("User cache:  {} (uid {})", user.name, user.uid),
        None => println!("User cache:  none"),
    }

    match base
        .map(|b| b.to_string())
        .or_else(|| store.inner().base_url.clone())
    {
        Some(url) => println!("Base URL:    {}", url),
        None => println!("Base URL:    not configured"),
    }

    if store.read_tokens().is_none() {
        println!("\nRun 'storefront-cli login' to authenticate.");
    }

    Ok(())
}

/// Show the current user profile (cached preferentially).
pub async fn whoami(base: Option<&str>) -> Result<()> {
    let manager = SessionManager::connect(base).await?;
    match manager.user() {
        Some(user) => {
            println!();
            println!("Name:   {}", user.name);
            println!(
                "Mail:   {}",
                if user.mail.is_empty() {
                    "(not cached)"
                } else {
                    user.mail.as_str()
                }
            );
            println!("Uid:    {}", user.uid);
            println!("Roles:  {}", user.roles.join(", "));
            if user.is_admin() {
                println!("Admin:  yes");
            }
        }
        None => {
            println!("Not logged in. Run 'storefront-cli login'.");
        }
    }
    Ok(())
}
