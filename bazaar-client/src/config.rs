//! Configuration loading for the Bazaar client.
//!
//! Only `api_base_url` is required. Without a `bearer_token` the client has
//! no session and session-bound calls become no-ops.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "BAZAAR_CLIENT_CONFIG";

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BazaarClientConfig {
    pub api_base_url: String,

    /// Access token of the signed-in user.
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub bearer_token: Option<SecretString>,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_heartbeat_interval_secs() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL_SECS
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|token| !token.trim().is_empty())
        .map(|token| SecretString::new(token.into())))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or BAZAAR_CLIENT_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl BazaarClientConfig {
    /// Load from `path`, falling back to `BAZAAR_CLIENT_CONFIG`.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = path
            .or_else(config_path_from_env)
            .ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.heartbeat_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "heartbeat_interval_secs",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    #[test]
    fn test_defaults_apply() {
        let config = BazaarClientConfig::from_toml(r#"api_base_url = "http://localhost:3000""#)
            .unwrap();
        assert!(config.bearer_token.is_none());
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(60));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        config.validate().unwrap();
    }

    #[test]
    fn test_blank_token_means_no_session() {
        let config = BazaarClientConfig::from_toml(
            "api_base_url = \"http://localhost:3000\"\nbearer_token = \"  \"",
        )
        .unwrap();
        assert!(config.bearer_token.is_none());
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let config = BazaarClientConfig::from_toml(
            "api_base_url = \"http://localhost:3000\"\nbearer_token = \"eyJ-secret\"",
        )
        .unwrap();
        assert_eq!(
            config.bearer_token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("eyJ-secret".to_string())
        );
        assert!(!format!("{:?}", config).contains("eyJ-secret"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config =
            BazaarClientConfig::from_toml(r#"api_base_url = "localhost:3000""#).unwrap();
        assert!(config.validate().is_err());

        config.api_base_url = "http://localhost:3000".to_string();
        config.heartbeat_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = BazaarClientConfig::from_toml(
            "api_base_url = \"http://localhost:3000\"\ntenant = \"x\"",
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = \"https://api.bazaar.market\"").unwrap();
        writeln!(file, "heartbeat_interval_secs = 30").unwrap();

        let config = BazaarClientConfig::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(30));
    }
}
