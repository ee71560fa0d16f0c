//! User profile model and role helpers

use serde::{Deserialize, Serialize};

/// Role every logged-in account carries.
pub const ROLE_AUTHENTICATED: &str = "authenticated";
pub const ROLE_ADMINISTRATOR: &str = "administrator";

/// Account profile as the backend exposes it. The copy written at login time
/// can be partial (blank mail/uuid) when it was synthesized from the login
/// response instead of a full profile fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "super::string_or_number")]
    pub uid: String,
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub mail: String,
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub access: String,
    #[serde(default)]
    pub login: String,
    #[serde(default = "default_status")]
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_last_name: Option<String>,
}

fn default_roles() -> Vec<String> {
    vec![ROLE_AUTHENTICATED.to_string()]
}

fn default_status() -> bool {
    true
}

impl UserProfile {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMINISTRATOR)
    }
}
