//! Backend configuration.
//!
//! Connection settings for the hosted database API that serves the
//! role-permission matrix. Configuration is loaded from environment
//! variables with defaults suitable for a local development stack.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::retry::RetryConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Hosted database settings used to fetch the permission matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the project (e.g. "https://abc.example-db.co").
    pub base_url: String,

    /// Public (anon) API key sent as `apikey` and bearer token.
    pub api_key: Option<String>,

    /// Table or view exposing the matrix rows.
    pub table: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum fetch attempts per load (1 disables retries).
    pub max_retries: u32,

    /// Fetch rows for every role instead of only the session's role.
    pub fetch_all_roles: bool,
}

impl Default for BackendConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: None,
            table: "role_permissions".to_string(),
            timeout_secs: 15,
            max_retries: 3,
            fetch_all_roles: false,
        }
    }
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `WORKFORCE_BACKEND_URL`: Project URL (default: http://localhost:54321)
    /// - `WORKFORCE_BACKEND_KEY`: Public API key
    /// - `WORKFORCE_PERMISSIONS_TABLE`: Matrix table (default: role_permissions)
    /// - `WORKFORCE_BACKEND_TIMEOUT_SECS`: Request timeout (default: 15)
    /// - `WORKFORCE_BACKEND_MAX_RETRIES`: Fetch attempts (default: 3)
    /// - `WORKFORCE_FETCH_ALL_ROLES`: Load all roles' rows (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unparseable numeric values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Self {
            base_url: lookup("WORKFORCE_BACKEND_URL").unwrap_or(default.base_url),
            api_key: lookup("WORKFORCE_BACKEND_KEY").filter(|k| !k.is_empty()),
            table: lookup("WORKFORCE_PERMISSIONS_TABLE").unwrap_or(default.table),
            timeout_secs: lookup("WORKFORCE_BACKEND_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
            max_retries: lookup("WORKFORCE_BACKEND_MAX_RETRIES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_retries),
            fetch_all_roles: lookup("WORKFORCE_FETCH_ALL_ROLES")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.fetch_all_roles),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Retry policy derived from `max_retries`.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retries.max(1),
            ..RetryConfig::default()
        }
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Check that the configuration can produce a request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("WORKFORCE_BACKEND_URL".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "WORKFORCE_BACKEND_URL".to_string(),
                message: format!("expected an http(s) URL, got {}", self.base_url),
            });
        }
        if self.table.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "WORKFORCE_PERMISSIONS_TABLE".to_string(),
                message: "table name is empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = BackendConfig::default();
        assert_eq!(config.table, "role_permissions");
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.retry_config().max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("WORKFORCE_BACKEND_URL", "https://hr.example.com"),
            ("WORKFORCE_BACKEND_KEY", "anon-key"),
            ("WORKFORCE_BACKEND_MAX_RETRIES", "0"),
            ("WORKFORCE_BACKEND_TIMEOUT_SECS", "soon"),
            ("WORKFORCE_FETCH_ALL_ROLES", "1"),
        ]
        .into_iter()
        .collect();

        let config = BackendConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.base_url, "https://hr.example.com");
        assert_eq!(config.api_key.as_deref(), Some("anon-key"));
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.retry_config().max_attempts, 1);
        assert!(config.fetch_all_roles);
    }

    #[test]
    fn test_url_joining() {
        let config = BackendConfig {
            base_url: "https://hr.example.com/".to_string(),
            ..BackendConfig::default()
        };
        assert_eq!(
            config.url("/rest/v1/role_permissions"),
            "https://hr.example.com/rest/v1/role_permissions"
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BackendConfig::default();
        config.base_url = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::MissingEnvVar(_))));

        config.base_url = "ftp://hr.example.com".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));

        config.base_url = "https://hr.example.com".to_string();
        config.table = " ".to_string();
        assert!(config.validate().is_err());
    }
}
