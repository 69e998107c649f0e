//! Error types for the record store.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`StoreError`]: Record store operation errors
//! - [`ConfigError`]: Configuration errors
//!
//! All errors implement `Send + Sync` for async compatibility.

use thiserror::Error;

/// Top-level application error.
///
/// This is the main error type returned by the script binaries.
/// It wraps all subsystem errors for unified error handling.
#[derive(Debug, Error)]
pub enum AppError {
    /// Record store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Record store errors.
///
/// These errors represent failures in database operations.
/// `ConstraintViolation` and `NotFound` are the two logical failures a
/// caller is expected to match on; the rest propagate unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Failed to connect to the database.
    #[error("Database connection failed: {message}")]
    ConnectionFailed {
        /// Description of the connection failure.
        message: String,
    },

    /// A database query failed.
    #[error("Query failed: {query} - {message}")]
    QueryFailed {
        /// The query that failed (may be truncated).
        query: String,
        /// Description of the failure.
        message: String,
    },

    /// A uniqueness invariant was violated on create or update.
    #[error("Constraint violation: {constraint}")]
    ConstraintViolation {
        /// The violated constraint, as reported by the database.
        constraint: String,
    },

    /// A single-record update or delete matched no record.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// The entity type that was looked up.
        entity: &'static str,
        /// Display form of the unique key that matched nothing.
        key: String,
    },

    /// Database migration failed.
    #[error("Migration failed: {version} - {message}")]
    MigrationFailed {
        /// The migration version that failed.
        version: String,
        /// Description of the failure.
        message: String,
    },

    /// Internal store error.
    #[error("Internal store error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StoreError {
    /// Returns true if this is a logical failure the caller can act on
    /// (a violated uniqueness rule or a missing update/delete target),
    /// as opposed to a connectivity or query problem.
    #[must_use]
    pub const fn is_logical(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolation { .. } | Self::NotFound { .. }
        )
    }
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}
