//! HTTP client for the storefront backend
//!
//! Wraps reqwest::Client with base URL handling and session credential
//! injection (session cookie + X-CSRF-Token header). Cookie-authenticated
//! state changes require the CSRF header; reads need only the cookie.

use anyhow::{Context, Result};
use thiserror::Error;

/// HTTP failure taxonomy for credentialed calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("401 Unauthorized for {url}: session is stale, log in again")]
    Unauthorized { url: String },
    #[error("HTTP {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },
}

#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
    csrf_token: Option<String>,
}

impl StorefrontClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            cookie: None,
            csrf_token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    pub fn set_csrf(&mut self, csrf_token: Option<String>) {
        self.csrf_token = csrf_token;
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn clear_session(&mut self) {
        self.cookie = None;
        self.csrf_token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET with the session cookie attached. The status is not checked here;
    /// callers decide (the cart mirror maps non-OK to an empty cart, the
    /// session layer runs the response through [`check_response`]).
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let mut req = self.http.get(&url);
        if let Some(cookie) = &self.cookie {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        req.send().await.with_context(|| format!("GET {} failed", url))
    }

    /// POST a JSON body with session cookie and CSRF header attached.
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let mut req = self.http.post(&url).json(body);
        if let Some(cookie) = &self.cookie {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(token) = &self.csrf_token {
            req = req.header("X-CSRF-Token", token);
        }
        req.send().await.with_context(|| format!("POST {} failed", url))
    }
}

/// Check HTTP response status and convert non-success to a typed error.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    let url = resp.url().to_string();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized { url }.into());
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            url,
            body,
        }
        .into());
    }
    Ok(resp)
}
