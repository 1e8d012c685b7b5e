//! Tracing subscriber setup
//!
//! JSON logs by default so log shippers can parse them; `BAZAAR_LOG_FORMAT=pretty`
//! switches to human-readable output for local work.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

const DEFAULT_FILTER: &str = "bazaar_api=debug,bazaar_storage=debug,tower_http=debug,info";

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup record
    pub service_name: String,
    /// Environment (production, staging, development)
    pub environment: String,
    /// Emit JSON lines instead of pretty text
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "bazaar-api".to_string(),
            environment: "development".to_string(),
            json: true,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();
        Self {
            service_name: lookup("BAZAAR_SERVICE_NAME").unwrap_or(defaults.service_name),
            environment: lookup("BAZAAR_ENVIRONMENT").unwrap_or(defaults.environment),
            json: lookup("BAZAAR_LOG_FORMAT")
                .map(|format| !format.eq_ignore_ascii_case("pretty"))
                .unwrap_or(defaults.json),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup. `RUST_LOG` overrides the default filter.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = config.service_name,
        environment = config.environment,
        "Telemetry initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_telemetry_config_default() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.service_name, "bazaar-api");
        assert_eq!(config.environment, "development");
        assert!(config.json);
    }

    #[test]
    fn test_pretty_format_disables_json() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("BAZAAR_LOG_FORMAT", "Pretty"),
            ("BAZAAR_ENVIRONMENT", "staging"),
        ]));
        assert!(!config.json);
        assert_eq!(config.environment, "staging");
    }
}
