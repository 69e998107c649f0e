//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading
//! - Configuration validation
//! - Default value handling
//!
//! # Example
//!
//! ```
//! use record_store::config::Config;
//!
//! // Create a config directly (use Config::from_env() in production)
//! let config = Config {
//!     database_path: "./data/records.db".to_string(),
//!     log_level: "info".to_string(),
//! };
//!
//! println!("Database at: {}", config.database_path);
//! ```

mod validation;

pub use validation::{validate_config, LOG_LEVELS};

use crate::error::ConfigError;

/// Default database path.
pub const DEFAULT_DATABASE_PATH: &str = "./data/records.db";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Application configuration.
///
/// This struct holds all configuration values for the record-store scripts.
/// Use [`Config::from_env`] to load configuration from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database path.
    pub database_path: String,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables (with defaults):
    /// - `DATABASE_PATH`: Path to the `SQLite` database (default: `./data/records.db`)
    /// - `LOG_LEVEL`: Logging level (default: `info`)
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any value fails validation
    /// (see [`validate_config`]).
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.into());

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into());

        let config = Self {
            database_path,
            log_level,
        };

        validate_config(&config)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.into(),
            log_level: DEFAULT_LOG_LEVEL.into(),
        }
    }
}
