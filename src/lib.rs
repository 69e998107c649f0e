//! Record Store
//!
//! A typed data-access façade over a fixed `SQLite` schema of users,
//! preferences, and posts.
//!
//! # Features
//!
//! - Per-entity create/read/update/delete operations
//! - Strongly-typed filter predicates (`equals`, `gt`, `lt`, `not`,
//!   `contains`, `starts_with`, `AND`/`OR`, nested-relation terms)
//! - Sort, skip, take, and distinct query options
//! - Eager loading of related records and field projection
//! - `SQLite` persistence with cascade deletes
//!
//! # Quick Start
//!
//! ```ignore
//! use record_store::config::Config;
//! use record_store::store::{NewUser, RecordStore};
//!
//! let config = Config::from_env()?;
//! let store = RecordStore::connect(&config.database_path).await?;
//! let user = store
//!     .create_user(NewUser::new("alice@example.com", "Alice", 30))
//!     .await?;
//! store.close().await;
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐           ┌──────────────────┐
//! │ script (bin) │──────────▶│   RecordStore    │──────▶ SQLite
//! │  seed/read/… │◀──────────│  (typed facade)  │
//! └──────────────┘  records  └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod query;
pub mod store;
