//! Remote session endpoints (cookie + CSRF authentication)
//!
//! The backend exposes no OAuth flow; the session is a server-side cookie
//! session guarded by a short-lived CSRF token. The CSRF token doubles as the
//! stored access token, and "refresh" is simply fetching a fresh CSRF token
//! against the still-valid cookie.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::json;

use super::tokens::AuthTokens;
use crate::api::client::{check_response, StorefrontClient};
use crate::models::user::ROLE_AUTHENTICATED;
use crate::models::UserProfile;

/// Session cookie lifetime mirrored into the stored expiry timestamp.
pub const SESSION_LIFETIME_SECS: u64 = 86400;
const TOKEN_TYPE: &str = "Bearer";

/// Registration payload. The backend wants each field nested as `{value}`.
#[derive(Debug, Clone)]
pub struct RegisterData {
    pub name: String,
    pub mail: String,
    pub pass: String,
    pub field_first_name: Option<String>,
    pub field_last_name: Option<String>,
}

/// Result of a successful login: token record, the profile embedded in the
/// login response (if any), and the session cookie issued by the backend.
#[derive(Debug)]
pub struct LoginOutcome {
    pub tokens: AuthTokens,
    pub user: Option<UserProfile>,
    pub cookie: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    current_user: Option<EmbeddedUser>,
    csrf_token: Option<String>,
    #[allow(dead_code)]
    logout_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedUser {
    #[serde(deserialize_with = "crate::models::string_or_number")]
    uid: String,
    name: String,
    #[serde(default)]
    roles: Vec<String>,
}

/// Fetch a CSRF token (plain-text body).
pub async fn fetch_csrf_token(client: &StorefrontClient) -> Result<String> {
    let resp = check_response(client.get("/session/token").await?).await?;
    let token = resp
        .text()
        .await
        .context("Failed to read CSRF token response")?;
    Ok(token.trim().to_string())
}

/// Credentialed login. Expects the client to already carry a fresh CSRF
/// token. Failures here propagate to the caller for display.
pub async fn login(
    client: &StorefrontClient,
    username: &str,
    password: &str,
) -> Result<LoginOutcome> {
    let body = json!({ "name": username, "pass": password });
    let resp = client.post_json("/user/login?_format=json", &body).await?;

    if !resp.status().is_success() {
        let message = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| "Invalid credentials".to_string());
        bail!("Login failed: {}", message);
    }

    let cookie = session_cookie(&resp);
    let data: LoginResponse = resp
        .json()
        .await
        .context("Failed to parse login response")?;

    let csrf = client.csrf_token().unwrap_or_default().to_string();
    let access_token = data.csrf_token.clone().unwrap_or_else(|| csrf.clone());
    let tokens = AuthTokens {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: SESSION_LIFETIME_SECS,
        refresh_token: Some(csrf),
    };

    // The login response carries only uid/name/roles. The synthesized profile
    // keeps mail and uuid blank until the next full refresh; known
    // data-completeness gap, preserved as-is.
    let user = data.current_user.map(|u| UserProfile {
        uid: u.uid,
        uuid: String::new(),
        name: u.name,
        mail: String::new(),
        roles: if u.roles.is_empty() {
            vec![ROLE_AUTHENTICATED.to_string()]
        } else {
            u.roles
        },
        created: String::new(),
        access: String::new(),
        login: String::new(),
        status: true,
        field_first_name: None,
        field_last_name: None,
    });

    Ok(LoginOutcome {
        tokens,
        user,
        cookie,
    })
}

/// Obtain a fresh token record against the existing session cookie. The
/// refresh token is not sent anywhere; the cookie authenticates this call.
pub async fn refresh_tokens(
    client: &StorefrontClient,
    _refresh_token: &str,
) -> Result<AuthTokens> {
    let csrf = fetch_csrf_token(client)
        .await
        .context("Failed to refresh session token")?;
    Ok(AuthTokens {
        access_token: csrf.clone(),
        token_type: TOKEN_TYPE.to_string(),
        expires_in: SESSION_LIFETIME_SECS,
        refresh_token: Some(csrf),
    })
}

/// Destroy the remote session. Callers treat failures as best-effort.
pub async fn logout(client: &StorefrontClient) -> Result<()> {
    let resp = client
        .post_json("/user/logout?_format=json", &json!({}))
        .await?;
    check_response(resp).await?;
    Ok(())
}

/// Whether the backend considers the session logged in (`"1"`/`"0"` text).
pub async fn login_status(client: &StorefrontClient) -> Result<bool> {
    let resp = check_response(client.get("/user/login_status?_format=json").await?).await?;
    let status = resp
        .text()
        .await
        .context("Failed to read login status response")?;
    Ok(status.trim() == "1")
}

/// Resolve the current user for an authenticated session. The backend has no
/// simple current-user endpoint, so this verifies the login status and
/// synthesizes a minimal profile; the real profile normally comes from the
/// login response and the user cache.
pub async fn current_user(client: &StorefrontClient) -> Result<UserProfile> {
    if !login_status(client).await? {
        bail!("Not authenticated");
    }
    Ok(UserProfile {
        uid: "0".to_string(),
        uuid: String::new(),
        name: "User".to_string(),
        mail: String::new(),
        roles: vec![ROLE_AUTHENTICATED.to_string()],
        created: String::new(),
        access: String::new(),
        login: String::new(),
        status: true,
        field_first_name: None,
        field_last_name: None,
    })
}

/// Register a new account. No session required.
pub async fn register(client: &StorefrontClient, data: &RegisterData) -> Result<UserProfile> {
    let body = json!({
        "name": { "value": data.name },
        "mail": { "value": data.mail },
        "pass": { "value": data.pass },
    });
    let resp = client.post_json("/user/register?_format=json", &body).await?;

    if !resp.status().is_success() {
        let message = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| "Registration failed".to_string());
        bail!("Registration failed: {}", message);
    }

    let entity: serde_json::Value = resp
        .json()
        .await
        .context("Failed to parse registration response")?;

    Ok(UserProfile {
        uid: field_value(&entity, "uid").unwrap_or_default(),
        uuid: field_value(&entity, "uuid").unwrap_or_default(),
        name: field_value(&entity, "name").unwrap_or_else(|| data.name.clone()),
        mail: field_value(&entity, "mail").unwrap_or_else(|| data.mail.clone()),
        roles: vec![ROLE_AUTHENTICATED.to_string()],
        created: field_value(&entity, "created").unwrap_or_default(),
        access: String::new(),
        login: String::new(),
        status: true,
        field_first_name: data.field_first_name.clone(),
        field_last_name: data.field_last_name.clone(),
    })
}

/// First value of a Drupal entity field (`{"uid": [{"value": 12}]}`).
fn field_value(entity: &serde_json::Value, field: &str) -> Option<String> {
    let value = entity.get(field)?.get(0)?.get("value")?;
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Collect session cookies from the login response into a Cookie header
/// value. The backend issues the session under a SSESS/SESS name; keep every
/// cookie it sets.
fn session_cookie(resp: &reqwest::Response) -> Option<String> {
    let cookies: Vec<String> = resp
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(|v| v.trim().to_string())
        .collect();
    if cookies.is_empty() {
        None
    } else {
        Some(cookies.join("; "))
    }
}
