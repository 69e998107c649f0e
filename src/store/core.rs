//! Core `SQLite` store implementation.
//!
//! This module provides the main [`RecordStore`] struct and core database
//! operations.

#![allow(clippy::missing_errors_doc)]

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;

/// `SQLite` record store.
///
/// Provides typed create/read/update/delete operations over users,
/// preferences, and posts.
#[derive(Debug, Clone)]
pub struct RecordStore {
    pub(crate) pool: SqlitePool,
}

impl RecordStore {
    /// Open (or create) a file-backed store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConnectionFailed`] if the connection fails.
    pub async fn connect(database_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = database_path.as_ref();

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::ConnectionFailed {
                message: format!("Failed to create database directory: {e}"),
            })?;
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", path.display()))
                .map_err(|e| StoreError::ConnectionFailed {
                    message: format!("Invalid database path: {e}"),
                })?
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true)
                .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                message: format!("Failed to connect to database: {e}"),
            })?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory store, mainly for testing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConnectionFailed`] if the connection fails.
    pub async fn connect_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::ConnectionFailed {
                message: format!("Invalid memory database options: {e}"),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                message: format!("Failed to create in-memory database: {e}"),
            })?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Close the connection pool.
    ///
    /// Idempotent; waits for in-flight operations to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Run database migrations.
    ///
    /// Migrations are run in order. Each migration is idempotent
    /// (uses IF NOT EXISTS).
    pub(crate) async fn run_migrations(&self) -> Result<(), StoreError> {
        // Migration 001: Initial schema
        let schema_001 = include_str!("../../migrations/001_initial_schema.sql");
        sqlx::query(schema_001)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed {
                version: "001".to_string(),
                message: format!("Failed to run migration 001: {e}"),
            })?;

        Ok(())
    }

    /// Parse a datetime string from the database.
    pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
        s.parse::<DateTime<Utc>>().map_err(|e| StoreError::Internal {
            message: format!("Failed to parse datetime '{s}': {e}"),
        })
    }

    /// Create a query error with the given query name and message.
    pub(crate) fn query_error(query: &str, message: String) -> StoreError {
        StoreError::QueryFailed {
            query: query.to_string(),
            message,
        }
    }

    /// Map a write failure, surfacing unique-key clashes as
    /// [`StoreError::ConstraintViolation`].
    pub(crate) fn write_error(query: &str, error: &sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_error) = error {
            if db_error.is_unique_violation() {
                return StoreError::ConstraintViolation {
                    constraint: db_error.message().to_string(),
                };
            }
        }
        Self::query_error(query, format!("{error}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub mod tests {
    use super::*;
    use serial_test::serial;

    pub async fn test_store() -> RecordStore {
        RecordStore::connect_in_memory()
            .await
            .expect("Failed to create test store")
    }

    #[tokio::test]
    #[serial]
    async fn test_connect_in_memory() {
        let store = RecordStore::connect_in_memory().await;
        assert!(store.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn test_connect_with_file() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let db_path = temp_dir.path().join("test_records.db");

        let store = RecordStore::connect(&db_path).await;
        assert!(store.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn test_connect_with_nested_path() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let db_path = temp_dir.path().join("deeply").join("nested").join("t.db");

        // Should create parent directories
        let store = RecordStore::connect(&db_path).await;
        assert!(store.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn test_migrations_are_idempotent() {
        let store = test_store().await;
        let result = store.run_migrations().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn test_close_is_idempotent() {
        let store = test_store().await;
        store.close().await;
        store.close().await;
    }

    #[test]
    fn test_parse_datetime_valid() {
        let result = RecordStore::parse_datetime("2024-01-15T10:30:00Z");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_datetime_invalid() {
        let result = RecordStore::parse_datetime("not-a-datetime");
        assert!(matches!(result, Err(StoreError::Internal { .. })));
    }

    #[test]
    fn test_query_error() {
        let err = RecordStore::query_error("SELECT users", "some db error".to_string());
        match err {
            StoreError::QueryFailed { query, message } => {
                assert_eq!(query, "SELECT users");
                assert_eq!(message, "some db error");
            }
            other => panic!("Expected QueryFailed error, got {other:?}"),
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_store_clone_shares_pool() {
        let store1 = test_store().await;
        let store2 = store1.clone();
        drop(store1);

        // Cloned store still works against the shared pool
        let result = sqlx::query("SELECT 1").fetch_one(&store2.pool).await;
        assert!(result.is_ok());
    }
}
