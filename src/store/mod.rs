//! Record store backend.
//!
//! This module provides:
//! - `SQLite` connection management and schema bootstrap
//! - User, preferences, and post CRUD operations
//!
//! # Architecture
//!
//! The store uses `SQLite` with the `sqlx` crate for async operations.
//! Single-statement writes are atomic; nested creates run in one
//! transaction. Cascades are enforced by the schema's foreign keys.
//!
//! The implementation is split across submodules for maintainability:
//! - `core`: Pool management, migrations, and helper functions
//! - `types`: Record, payload, key, and projection types
//! - `user`: User CRUD operations
//! - `preferences`: Preferences operations
//! - `post`: Post CRUD operations
//!
//! # Example
//!
//! ```ignore
//! use record_store::store::{NewUser, RecordStore};
//!
//! let store = RecordStore::connect("./data/records.db").await?;
//! let user = store.create_user(NewUser::new("a@x.com", "A", 25)).await?;
//! ```

mod core;
mod post;
mod preferences;
mod types;
mod user;

pub use self::core::RecordStore;
pub use types::{
    NewPost, NewPreferences, NewUser, Post, PostUpdate, Preferences, PreferencesKey,
    PreferencesSelect, User, UserKey, UserSelect, UserUpdate,
};
