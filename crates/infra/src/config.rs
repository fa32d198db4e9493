//! Configuration loading and representation.
//!
//! Configuration comes from the process environment (optionally seeded from a
//! `.env` file) and is read once at startup.

use thiserror::Error;

/// Store location used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://pharmastock.db?mode=rwc";

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const BOOTSTRAP_SCHEMA_VAR: &str = "PHARMASTOCK_BOOTSTRAP_SCHEMA";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}' (expected true/false)")]
    InvalidBool { key: &'static str, value: String },

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    /// Create missing tables at startup.
    pub bootstrap_schema: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bootstrap_schema: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment, honoring a `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!("ignoring unreadable .env file: {err}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (environment, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_VAR) {
            if url.trim().is_empty() {
                return Err(ConfigError::Empty(DATABASE_URL_VAR));
            }
            config.database_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(BOOTSTRAP_SCHEMA_VAR) {
            config.bootstrap_schema = parse_bool(BOOTSTRAP_SCHEMA_VAR, &raw)?;
        }

        Ok(config)
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: raw.to_string(),
        }),
    }
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
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert!(config.bootstrap_schema);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (DATABASE_URL_VAR, " sqlite::memory: "),
            (BOOTSTRAP_SCHEMA_VAR, "off"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(!config.bootstrap_schema);
    }

    #[test]
    fn invalid_bool_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(BOOTSTRAP_SCHEMA_VAR, "maybe")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidBool {
                key: BOOTSTRAP_SCHEMA_VAR,
                value: "maybe".to_string()
            }
        );
    }

    #[test]
    fn empty_database_url_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(DATABASE_URL_VAR, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty(DATABASE_URL_VAR));
    }
}
