//! Process configuration: compiled-in defaults, then an optional TOML file,
//! then `CASEFORGE_`-prefixed environment variables (nested keys split on `__`).

use crate::application::ContextStoreConfig;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::{
    LLMConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, SYNTHESIS_TEMPERATURE,
};
use crate::domain::settings::AdminSettings;
use crate::domain::user::UserAccount;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "caseforge.toml";
pub const CONFIG_PATH_ENV: &str = "CASEFORGE_CONFIG";
const ENV_PREFIX: &str = "CASEFORGE_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_output_tokens: Option<u32>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: SYNTHESIS_TEMPERATURE,
            timeout_secs: 120,
            max_output_tokens: None,
        }
    }
}

impl LlmSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn llm_config(&self, api_key: &str) -> LLMConfig {
        LLMConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key: None,
            max_tokens: self.max_output_tokens,
            temperature: Some(self.temperature),
        }
        .with_api_key(api_key)
    }
}

/// Initial admin settings; kept snake_case so env overrides map onto it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InitialSettings {
    pub gemini_api_key: String,
    pub jira_token: String,
    pub max_test_cases: u32,
    pub enable_follow_up_questions: bool,
}

impl Default for InitialSettings {
    fn default() -> Self {
        let defaults = AdminSettings::default();
        Self {
            gemini_api_key: defaults.gemini_api_key,
            jira_token: defaults.jira_token,
            max_test_cases: defaults.max_test_cases,
            enable_follow_up_questions: defaults.enable_follow_up_questions,
        }
    }
}

impl From<InitialSettings> for AdminSettings {
    fn from(settings: InitialSettings) -> Self {
        AdminSettings {
            gemini_api_key: settings.gemini_api_key,
            jira_token: settings.jira_token,
            max_test_cases: settings.max_test_cases,
            enable_follow_up_questions: settings.enable_follow_up_questions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub users: Vec<UserAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub uploads_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("uploads"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContextsConfig {
    /// Unset means suspended contexts never expire.
    pub max_age_secs: Option<u64>,
    pub sweep_interval_secs: u64,
}

impl Default for ContextsConfig {
    fn default() -> Self {
        Self {
            max_age_secs: None,
            sweep_interval_secs: 60,
        }
    }
}

impl ContextsConfig {
    pub fn store_config(&self) -> ContextStoreConfig {
        ContextStoreConfig {
            max_age: self.max_age_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmSection,
    pub settings: InitialSettings,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub contexts: ContextsConfig,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            llm: LlmSection::default(),
            settings: InitialSettings::default(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            contexts: ContextsConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_figment(Self::figment(&path))
    }

    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::ConfigError("server.port must be non-zero".to_string()));
        }
        if self.settings.max_test_cases == 0 {
            return Err(AppError::ConfigError(
                "settings.max_test_cases must be a positive integer".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "llm.timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.contexts.sweep_interval_secs == 0 {
            return Err(AppError::ConfigError(
                "contexts.sweep_interval_secs must be non-zero".to_string(),
            ));
        }
        for origin in &self.server.allowed_origins {
            if origin != "*" && !is_valid_origin(origin) {
                return Err(AppError::ConfigError(format!(
                    "server.allowed_origins entry '{}' must look like scheme://host[:port]",
                    origin
                )));
            }
        }
        for user in &self.auth.users {
            let digest = user.password_sha256.trim();
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(AppError::ConfigError(format!(
                    "auth user '{}' needs a 64-character hex password_sha256",
                    user.username
                )));
            }
        }
        Ok(())
    }
}

fn is_valid_origin(origin: &str) -> bool {
    match url::Url::parse(origin) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some()
                && url.path() == "/"
                && !origin.ends_with('/')
                && url.query().is_none()
                && url.fragment().is_none()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Result<AppConfig> {
        AppConfig::from_figment(
            Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(toml)),
        )
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.settings.max_test_cases, 10);
        assert!(config.settings.enable_follow_up_questions);
        assert!(config.contexts.max_age_secs.is_none());
        assert_eq!(config.llm.model, "gemini-1.5-pro");
    }

    #[test]
    fn test_toml_overrides_nested_sections() {
        let config = from_toml(
            r#"
            log_filter = "debug"

            [server]
            port = 9000

            [settings]
            max_test_cases = 5
            enable_follow_up_questions = false

            [contexts]
            max_age_secs = 900

            [[auth.users]]
            username = "admin"
            password_sha256 = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.settings.max_test_cases, 5);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(
            config.contexts.store_config().max_age,
            Some(Duration::from_secs(900))
        );
        assert_eq!(config.auth.users[0].role, "Administrator");

        let settings: AdminSettings = config.settings.into();
        assert!(!settings.enable_follow_up_questions);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            from_toml("[settings]\nmax_test_cases = 0"),
            Err(AppError::ConfigError(_))
        ));
        assert!(matches!(
            from_toml("[[auth.users]]\nusername = \"admin\"\npassword_sha256 = \"plaintext\""),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn test_allowed_origins_are_checked_at_load() {
        for origin in ["not a url", "localhost:3000", "http://localhost:3000/app", "ftp://host"] {
            let toml = format!("[server]\nallowed_origins = [\"{}\"]", origin);
            assert!(
                matches!(from_toml(&toml), Err(AppError::ConfigError(_))),
                "accepted {}",
                origin
            );
        }

        let config = from_toml(
            "[server]\nallowed_origins = [\"https://qa.example.org\", \"http://127.0.0.1:3000\", \"*\"]",
        )
        .unwrap();
        assert_eq!(config.server.allowed_origins.len(), 3);
    }

    #[test]
    fn test_llm_config_carries_runtime_key() {
        let section = LlmSection::default();
        let config = section.llm_config("key-123");
        assert_eq!(config.api_key.as_deref(), Some("key-123"));
        assert_eq!(config.temperature, Some(SYNTHESIS_TEMPERATURE));
        assert!(section.llm_config("").api_key.is_none());
    }
}
