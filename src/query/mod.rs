//! Typed query predicates and options.
//!
//! This module provides:
//! - Scalar filter operators ([`IntFilter`], [`StringFilter`])
//! - Per-entity filters with `AND`/`OR` composition and nested-relation
//!   terms ([`UserFilter`], [`PreferencesFilter`], [`PostFilter`])
//! - Per-entity query options carrying sort, skip, take, distinct, and
//!   eager-loading choices ([`UserQuery`], [`PostQuery`])
//!
//! # Architecture
//!
//! Filters are plain data: tagged operator variants assembled with builder
//! methods, so an invalid predicate is unrepresentable. The store renders a
//! filter once into a parameterized SQL fragment and binds the collected
//! values; filter construction itself never touches the database.
//!
//! # Example
//!
//! ```
//! use record_store::query::{IntFilter, StringFilter, UserFilter, UserQuery};
//!
//! let filter = UserFilter::default()
//!     .age(IntFilter::Gt(1))
//!     .age(IntFilter::Lt(30))
//!     .or(UserFilter::default().name(StringFilter::contains("e")))
//!     .or(UserFilter::default().name(StringFilter::starts_with("J")));
//!
//! let query = UserQuery::default().filter(filter).take(10);
//! assert_eq!(query.take, Some(10));
//! ```

mod filter;
mod options;
mod scalar;
mod sql;

pub use filter::{PostFilter, PreferencesFilter, UserFilter};
pub use options::{PostField, PostQuery, SortOrder, UserField, UserInclude, UserQuery};
pub use scalar::{IntFilter, StringFilter};

pub(crate) use options::{distinct_by, paginate, FieldValue};
pub(crate) use sql::{bind_values, Bind, Sql};
