//! Configuration validation.
//!
//! This module provides validation logic for configuration values.

use super::Config;
use crate::error::ConfigError;

/// Recognized log levels.
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if:
/// - `DATABASE_PATH` is empty
/// - `LOG_LEVEL` is not one of `error`, `warn`, `info`, `debug`, `trace`
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "DATABASE_PATH".into(),
            reason: "must not be empty".into(),
        });
    }

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        return Err(ConfigError::InvalidValue {
            var: "LOG_LEVEL".into(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }

    Ok(())
}
