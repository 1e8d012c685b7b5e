//! API Configuration Module
//!
//! Server configuration for CORS, the admin allow-list, presence coalescing
//! and view revalidation. Loaded from environment variables with defaults
//! suitable for development.

use crate::constants::{DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_PRESENCE_COALESCE_SECS};
use crate::error::{ApiError, ApiResult};
use bazaar_core::AdminAllowList;
use secrecy::SecretString;
use std::time::Duration;

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Marketplace Configuration
    // ========================================================================
    /// Addresses promoted to admin by role sync. Never sent to clients.
    pub admin_emails: AdminAllowList,

    /// Heartbeats from one user inside this window are coalesced.
    pub presence_coalesce: Duration,

    /// Frontend endpoint receiving revalidation webhooks.
    pub revalidate_url: Option<String>,

    pub revalidate_secret: Option<SecretString>,

    /// Deployment environment name (`development`, `production`, ...).
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            admin_emails: AdminAllowList::default(),
            presence_coalesce: Duration::from_secs(DEFAULT_PRESENCE_COALESCE_SECS),
            revalidate_url: None,
            revalidate_secret: None,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `BAZAAR_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `BAZAAR_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `BAZAAR_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `BAZAAR_ADMIN_EMAILS`: Comma-separated admin allow-list
    /// - `BAZAAR_PRESENCE_COALESCE_SECS`: Heartbeat coalescing window (default: 15)
    /// - `BAZAAR_REVALIDATE_URL`, `BAZAAR_REVALIDATE_SECRET`: revalidation webhook
    /// - `BAZAAR_ENVIRONMENT`: deployment environment (default: development)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let cors_origins = non_empty("BAZAAR_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = non_empty("BAZAAR_CORS_ALLOW_CREDENTIALS")
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = non_empty("BAZAAR_CORS_MAX_AGE_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CORS_MAX_AGE_SECS);

        let admin_emails = non_empty("BAZAAR_ADMIN_EMAILS")
            .map(|s| AdminAllowList::from_csv(&s))
            .unwrap_or_default();

        let presence_coalesce = Duration::from_secs(
            non_empty("BAZAAR_PRESENCE_COALESCE_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PRESENCE_COALESCE_SECS),
        );

        Self {
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            admin_emails,
            presence_coalesce,
            revalidate_url: non_empty("BAZAAR_REVALIDATE_URL"),
            revalidate_secret: non_empty("BAZAAR_REVALIDATE_SECRET")
                .map(|s| SecretString::new(s.into())),
            environment: non_empty("BAZAAR_ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // *.bazaar.market
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain
                        .strip_suffix(pattern)
                        .is_some_and(|sub| sub.ends_with('.'));
                }
            }
            false
        })
    }

    /// Refuse configurations that are only acceptable in development.
    pub fn validate_for_production(&self) -> ApiResult<()> {
        if !self.is_production() {
            if self.admin_emails.is_empty() {
                tracing::warn!("BAZAAR_ADMIN_EMAILS is empty; role sync will promote nobody");
            }
            return Ok(());
        }
        if self.cors_origins.is_empty() {
            return Err(ApiError::invalid_input(
                "CORS origins not configured for production. Set BAZAAR_CORS_ORIGINS.",
            ));
        }
        if self.revalidate_url.is_some() && self.revalidate_secret.is_none() {
            return Err(ApiError::invalid_input(
                "BAZAAR_REVALIDATE_URL is set without BAZAAR_REVALIDATE_SECRET.",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> ApiConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert!(!config.cors_allow_credentials);
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.presence_coalesce, Duration::from_secs(15));
        assert!(config.admin_emails.is_empty());
        assert!(!config.is_production());
    }

    #[test]
    fn test_admin_emails_parsed() {
        let config = from_map(&[("BAZAAR_ADMIN_EMAILS", " Root@Example.com , ops@example.com,")]);
        assert_eq!(config.admin_emails.len(), 2);
        assert!(config.admin_emails.contains("root@example.com"));
        assert!(config.admin_emails.contains("OPS@example.com"));
    }

    #[test]
    fn test_origin_allowed_dev_mode() {
        let config = ApiConfig::default();
        assert!(config.is_origin_allowed("https://anything.com"));
        assert!(config.is_origin_allowed("http://localhost:3000"));
    }

    #[test]
    fn test_origin_allowed_production() {
        let config = from_map(&[(
            "BAZAAR_CORS_ORIGINS",
            "https://bazaar.market,https://app.bazaar.market",
        )]);

        assert!(config.is_origin_allowed("https://bazaar.market"));
        assert!(config.is_origin_allowed("https://app.bazaar.market"));
        assert!(!config.is_origin_allowed("https://evil.com"));
    }

    #[test]
    fn test_wildcard_subdomain() {
        let mut config = ApiConfig::default();
        config.cors_origins = vec!["*.bazaar.market".to_string()];

        assert!(config.is_origin_allowed("https://app.bazaar.market"));
        assert!(!config.is_origin_allowed("https://notbazaar.market"));
        assert!(!config.is_origin_allowed("https://evil.com"));
    }

    #[test]
    fn test_production_requires_cors_origins() {
        let config = from_map(&[("BAZAAR_ENVIRONMENT", "production")]);
        assert!(config.is_production());
        assert!(config.validate_for_production().is_err());

        let config = from_map(&[
            ("BAZAAR_ENVIRONMENT", "production"),
            ("BAZAAR_CORS_ORIGINS", "https://bazaar.market"),
        ]);
        assert!(config.validate_for_production().is_ok());
    }
}
