use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::fmt;
use validator::Validate;

use crate::error::{DashboardError, Result};
use crate::utils::constants::DEFAULT_DB_PORT;

const ENV_PREFIX: &str = "DB";
const API_KEY_VAR: &str = "VC_API_KEY";

/// Settings as they arrive from the environment, before required-field checks.
#[derive(Debug, Deserialize)]
struct RawSettings {
    host: Option<String>,
    port: u16,
    user: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

#[derive(Clone, Validate)]
pub struct WarehouseConfig {
    #[validate(length(min = 1, message = "DB_HOST must not be empty"))]
    pub host: String,

    #[validate(range(min = 1, message = "DB_PORT must be a non-zero port"))]
    pub port: u16,

    #[validate(length(min = 1, message = "DB_USER must not be empty"))]
    pub user: String,

    pub password: String,

    #[validate(length(min = 1, message = "DB_NAME must not be empty"))]
    pub database: String,

    /// Reserved for the ingestion pipeline; read so a shared `.env` works
    /// unchanged, never used here.
    pub vc_api_key: Option<String>,
}

impl WarehouseConfig {
    /// Reads `DB_*` from the process environment, loading `.env` first when
    /// one exists.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let api_key = std::env::var(API_KEY_VAR).ok();
        Self::build(config::Environment::with_prefix(ENV_PREFIX), api_key)
    }

    /// Same pipeline as [`from_env`](Self::from_env) over an explicit map of
    /// variable names to values.
    pub fn from_map(vars: config::Map<String, String>) -> Result<Self> {
        let api_key = vars.get(API_KEY_VAR).cloned();
        Self::build(
            config::Environment::with_prefix(ENV_PREFIX).source(Some(vars)),
            api_key,
        )
    }

    fn build(source: config::Environment, vc_api_key: Option<String>) -> Result<Self> {
        let raw: RawSettings = config::Config::builder()
            .set_default("port", i64::from(DEFAULT_DB_PORT))?
            .add_source(source)
            .build()?
            .try_deserialize()?;

        let missing: Vec<&str> = [
            ("DB_HOST", raw.host.is_none()),
            ("DB_USER", raw.user.is_none()),
            ("DB_PASSWORD", raw.password.is_none()),
            ("DB_NAME", raw.name.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(var, _)| *var)
        .collect();

        if !missing.is_empty() {
            return Err(DashboardError::Configuration(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let config = Self {
            host: raw.host.unwrap_or_default(),
            port: raw.port,
            user: raw.user.unwrap_or_default(),
            password: raw.password.unwrap_or_default(),
            database: raw.name.unwrap_or_default(),
            vc_api_key,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

impl fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("vc_api_key", &self.vc_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_complete_settings_with_default_port() {
        let config = WarehouseConfig::from_map(vars(&[
            ("DB_HOST", "warehouse.local"),
            ("DB_USER", "reader"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "warehouse"),
        ]))
        .unwrap();

        assert_eq!(config.host, "warehouse.local");
        assert_eq!(config.port, 5432);
        assert_eq!(config.database, "warehouse");
        assert!(config.vc_api_key.is_none());
    }

    #[test]
    fn test_explicit_port_and_api_key() {
        let config = WarehouseConfig::from_map(vars(&[
            ("DB_HOST", "db"),
            ("DB_PORT", "6543"),
            ("DB_USER", "reader"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "warehouse"),
            ("VC_API_KEY", "abc123"),
        ]))
        .unwrap();

        assert_eq!(config.port, 6543);
        assert_eq!(config.vc_api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_missing_settings_are_named() {
        let err = WarehouseConfig::from_map(vars(&[("DB_HOST", "db")])).unwrap_err();
        match err {
            DashboardError::Configuration(message) => {
                assert!(message.contains("DB_USER"));
                assert!(message.contains("DB_PASSWORD"));
                assert!(message.contains("DB_NAME"));
                assert!(!message.contains("DB_HOST"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_port_is_configuration_error() {
        let err = WarehouseConfig::from_map(vars(&[
            ("DB_HOST", "db"),
            ("DB_PORT", "not-a-port"),
            ("DB_USER", "reader"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "warehouse"),
        ]))
        .unwrap_err();
        assert!(matches!(err, DashboardError::Configuration(_)));
    }

    #[test]
    fn test_empty_host_fails_validation() {
        let err = WarehouseConfig::from_map(vars(&[
            ("DB_HOST", ""),
            ("DB_USER", "reader"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "warehouse"),
        ]))
        .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = WarehouseConfig::from_map(vars(&[
            ("DB_HOST", "db"),
            ("DB_USER", "reader"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_NAME", "warehouse"),
        ]))
        .unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
