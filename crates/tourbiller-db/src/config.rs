//! Application configuration.
//!
//! Configuration is loaded from `TOURBILLER_*` environment variables with
//! fallback to defaults.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use tourbiller_core::validation::validate_currency_code;
use tourbiller_core::DEFAULT_CURRENCY;

use crate::pool::DbConfig;

/// Sri Lanka Standard Time, UTC+05:30.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Runtime configuration shared by the seed tool and any embedding app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Business-local offset used for the yearly/weekly revenue windows
    pub utc_offset_minutes: i32,

    /// Base currency of stored totals
    pub currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from("tourbiller.db"),
            max_connections: 5,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let config = AppConfig {
            database_path: lookup("TOURBILLER_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: lookup("TOURBILLER_MAX_CONNECTIONS")
                .unwrap_or_else(|| defaults.max_connections.to_string())
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TOURBILLER_MAX_CONNECTIONS".to_string()))?,

            utc_offset_minutes: lookup("TOURBILLER_UTC_OFFSET_MINUTES")
                .unwrap_or_else(|| defaults.utc_offset_minutes.to_string())
                .trim()
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("TOURBILLER_UTC_OFFSET_MINUTES".to_string())
                })?,

            currency: lookup("TOURBILLER_CURRENCY")
                .map(|c| c.trim().to_ascii_uppercase())
                .unwrap_or(defaults.currency),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "TOURBILLER_MAX_CONNECTIONS".to_string(),
            ));
        }

        if config.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::InvalidValue(
                "TOURBILLER_UTC_OFFSET_MINUTES".to_string(),
            ));
        }

        validate_currency_code(&config.currency)
            .map_err(|_| ConfigError::InvalidValue("TOURBILLER_CURRENCY".to_string()))?;

        Ok(config)
    }

    /// The configured business-local offset.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Pool settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .utc_offset(self.utc_offset())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
