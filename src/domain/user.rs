use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub username: String,
    pub role: String,
    pub login_time: DateTime<Local>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub username: String,
    pub role: String,
    pub last_login: Option<String>,
    pub status: String,
}

/// A configured login. Passwords are stored as lowercase SHA-256 hex digests.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub username: String,
    pub password_sha256: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "Administrator".to_string()
}
