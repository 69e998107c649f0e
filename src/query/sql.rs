//! Parameterized SQL fragments.
//!
//! A [`Sql`] pairs a `WHERE`-clause fragment with the values bound to its
//! placeholders, so fragments can be composed without ever interpolating
//! user data into the query text.

use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

/// A single bound value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Bind {
    /// Integer value.
    Int(i64),
    /// Text value.
    Text(String),
    /// Boolean value.
    Bool(bool),
}

/// A SQL fragment with its bound values.
///
/// Invariant: `clause` contains exactly `binds.len()` `?` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Sql {
    /// The clause text with `?` placeholders.
    pub clause: String,
    /// Values for the placeholders, in order.
    pub binds: Vec<Bind>,
}

impl Sql {
    /// Create a fragment from a clause and its binds.
    pub fn new(clause: impl Into<String>, binds: Vec<Bind>) -> Self {
        Self {
            clause: clause.into(),
            binds,
        }
    }

    /// A fragment that matches every row.
    pub fn always() -> Self {
        Self::new("1=1", Vec::new())
    }

    /// Conjoin fragments. An empty list matches every row.
    pub fn and_group(parts: Vec<Self>) -> Self {
        Self::group(parts, " AND ")
    }

    /// Disjoin fragments. An empty list matches every row.
    pub fn or_group(parts: Vec<Self>) -> Self {
        Self::group(parts, " OR ")
    }

    fn group(mut parts: Vec<Self>, separator: &str) -> Self {
        match parts.len() {
            0 => Self::always(),
            1 => parts.remove(0),
            _ => {
                let clause = format!(
                    "({})",
                    parts
                        .iter()
                        .map(|p| p.clause.as_str())
                        .collect::<Vec<_>>()
                        .join(separator)
                );
                let binds = parts.into_iter().flat_map(|p| p.binds).collect();
                Self::new(clause, binds)
            }
        }
    }
}

/// Attach a fragment's binds to a query, in order.
pub(crate) fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    binds: &[Bind],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for bind in binds {
        query = match bind {
            Bind::Int(value) => query.bind(*value),
            Bind::Text(value) => query.bind(value.clone()),
            Bind::Bool(value) => query.bind(*value),
        };
    }
    query
}
