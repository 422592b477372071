use crate::domain::error::{AppError, Result};
use crate::domain::user::{UserAccount, UserSession, UserSummary};
use chrono::Local;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn digests_match(left: &str, right: &str) -> bool {
    let left = left.as_bytes();
    let right = right.as_bytes();
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Credential check plus bearer-token session issuance.
///
/// Sessions are held in process memory until `logout` removes them; a
/// restart drops them all.
pub struct AuthService {
    accounts: Vec<UserAccount>,
    sessions: Mutex<HashMap<String, UserSession>>,
}

impl AuthService {
    pub fn new(accounts: Vec<UserAccount>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|account| UserAccount {
                password_sha256: account.password_sha256.trim().to_ascii_lowercase(),
                ..account
            })
            .collect();
        Self {
            accounts,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, UserSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        let digest = hash_password(password);
        let account = self
            .accounts
            .iter()
            .find(|account| account.username == username)
            .filter(|account| digests_match(&account.password_sha256, &digest))
            .ok_or_else(|| {
                warn!(username, "Rejected login");
                AppError::Unauthorized("Invalid credentials".to_string())
            })?;

        let token = Uuid::new_v4().to_string();
        let session = UserSession {
            username: account.username.clone(),
            role: account.role.clone(),
            login_time: Local::now(),
        };
        self.sessions().insert(token.clone(), session);
        info!(username, "User logged in");
        Ok(token)
    }

    pub fn authenticate(&self, token: &str) -> Result<UserSession> {
        self.sessions()
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions().remove(token).is_some()
    }

    pub fn list_users(&self) -> Vec<UserSummary> {
        let sessions = self.sessions();
        self.accounts
            .iter()
            .map(|account| {
                let last_login = sessions
                    .values()
                    .filter(|session| session.username == account.username)
                    .map(|session| session.login_time)
                    .max();
                UserSummary {
                    username: account.username.clone(),
                    role: account.role.clone(),
                    last_login: last_login
                        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string()),
                    status: if last_login.is_some() {
                        "active".to_string()
                    } else {
                        "inactive".to_string()
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(vec![UserAccount {
            username: "admin".to_string(),
            password_sha256: hash_password("s3cret").to_uppercase(),
            role: "Administrator".to_string(),
        }])
    }

    #[test]
    fn test_hash_password_is_sha256_hex() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_login_issues_token_that_authenticates() {
        let auth = service();
        let token = auth.login("admin", "s3cret").unwrap();
        let session = auth.authenticate(&token).unwrap();
        assert_eq!(session.username, "admin");
        assert_eq!(session.role, "Administrator");
    }

    #[test]
    fn test_bad_credentials_are_unauthorized() {
        let auth = service();
        assert!(matches!(
            auth.login("admin", "wrong"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.login("nobody", "s3cret"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.authenticate("not-a-token"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_logout_revokes_token() {
        let auth = service();
        let token = auth.login("admin", "s3cret").unwrap();
        assert!(auth.logout(&token));
        assert!(auth.authenticate(&token).is_err());
    }

    #[test]
    fn test_list_users_reports_last_login() {
        let auth = service();
        assert_eq!(auth.list_users()[0].status, "inactive");
        auth.login("admin", "s3cret").unwrap();
        let users = auth.list_users();
        assert_eq!(users[0].status, "active");
        assert!(users[0].last_login.is_some());
    }
}
