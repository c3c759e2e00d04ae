//! Lifecycle manager configuration.
//!
//! [`ManagerConfig::load`] resolves configuration in the following order
//! (later overrides earlier):
//! 1. Default values
//! 2. JSON document, if given
//! 3. Environment variables
//!
//! [`ManagerConfig::from_json`] and [`ManagerConfig::from_env`] apply only
//! their own layer on top of the defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`ManagerConfig::error_key`].
pub const ENV_ERROR_KEY: &str = "STATEKEEPER_ERROR_KEY";
/// Environment variable overriding [`ManagerConfig::record_error_message`].
pub const ENV_RECORD_ERROR: &str = "STATEKEEPER_RECORD_ERROR";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Behaviour of the [`LifecycleManager`](super::LifecycleManager) when a guard
/// or action fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Context variable receiving the failure message.
    pub error_key: String,
    /// Whether the failure message is written into the context at all.
    pub record_error_message: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            error_key: "error".to_string(),
            record_error_message: true,
        }
    }
}

impl ManagerConfig {
    /// Defaults, then `json` if given, then environment variable overrides.
    pub fn load(json: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_with(json, |name| std::env::var(name).ok())
    }

    fn load_with(
        json: Option<&str>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match json {
            Some(json) => Self::parse(json)?,
            None => Self::default(),
        };
        config.apply_overrides(var);
        config.validate()?;
        Ok(config)
    }

    fn parse(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse a JSON document, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config = Self::parse(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment variable overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Applies environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var(ENV_ERROR_KEY) {
            self.error_key = key;
        }

        if let Some(flag) = var(ENV_RECORD_ERROR) {
            self.record_error_message = flag == "1" || flag.eq_ignore_ascii_case("true");
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.error_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "error_key must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = ManagerConfig::default();
        assert_eq!(config.error_key, "error");
        assert!(config.record_error_message);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_fills_missing_fields() {
        let config = ManagerConfig::from_json(r#"{"error_key": "failure"}"#).unwrap();
        assert_eq!(config.error_key, "failure");
        assert!(config.record_error_message);
    }

    #[test]
    fn json_rejects_blank_key() {
        let err = ManagerConfig::from_json(r#"{"error_key": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn json_reports_parse_errors() {
        let err = ManagerConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_replace_values() {
        let vars: HashMap<&str, &str> =
            [(ENV_ERROR_KEY, "cause"), (ENV_RECORD_ERROR, "FALSE")].into();

        let mut config = ManagerConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.error_key, "cause");
        assert!(!config.record_error_message);
    }

    #[test]
    fn load_layers_env_over_json() {
        let vars: HashMap<&str, &str> = [(ENV_RECORD_ERROR, "0")].into();

        let config = ManagerConfig::load_with(
            Some(r#"{"error_key": "failure", "record_error_message": true}"#),
            |name| vars.get(name).map(|v| v.to_string()),
        )
        .unwrap();

        assert_eq!(config.error_key, "failure");
        assert!(!config.record_error_message);
    }

    #[test]
    fn load_validates_after_overrides() {
        let vars: HashMap<&str, &str> = [(ENV_ERROR_KEY, " ")].into();

        let err = ManagerConfig::load_with(None, |name| vars.get(name).map(|v| v.to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn absent_overrides_keep_values() {
        let mut config = ManagerConfig::default();
        config.apply_overrides(|_| None);
        assert_eq!(config, ManagerConfig::default());
    }
}
