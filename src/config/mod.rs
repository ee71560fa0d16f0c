//! Configuration and session persistence

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::auth::SessionStore;

/// Application configuration. The `session` table holds the keyed session
/// entries (tokens, expiry, user, cookie) managed by the token store.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storefront backend base URL (e.g. <https://shop.example.com>)
    pub base_url: Option<String>,
    #[serde(default)]
    session: BTreeMap<String, String>,
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "storefront-cli", "storefront-cli")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;

        // Set restrictive permissions on config file (contains session material)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    /// Resolve the backend base URL: CLI flag, then STOREFRONT_BASE_URL env,
    /// then the config file.
    pub fn resolve_base_url(&self, flag: Option<&str>) -> Result<String> {
        if let Some(url) = flag {
            return Ok(url.trim_end_matches('/').to_string());
        }
        if let Ok(url) = std::env::var("STOREFRONT_BASE_URL") {
            if !url.is_empty() {
                return Ok(url.trim_end_matches('/').to_string());
            }
        }
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .context(
                "No base URL configured. Pass --base-url, set STOREFRONT_BASE_URL, \
                 or run 'storefront-cli set-url <URL>'.",
            )
    }

    pub fn set_base_url(&mut self, url: &str) {
        self.base_url = Some(url.trim_end_matches('/').to_string());
    }
}

impl SessionStore for Config {
    fn get(&self, key: &str) -> Option<String> {
        self.session.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.session.insert(key.to_string(), value);
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.session.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}
