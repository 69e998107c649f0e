//! Scalar filter operators.
//!
//! One value of [`IntFilter`] or [`StringFilter`] is a single comparison
//! against a column. Entity filters hold lists of these; all operators on
//! the same field are conjoined, matching the `{gt: 1, lt: 30, not: 25}`
//! shape of the source query objects.

use serde::{Deserialize, Serialize};

use super::sql::{Bind, Sql};

/// One comparison against an integer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntFilter {
    /// Column equals the value.
    Equals(i64),
    /// Column is strictly greater than the value.
    Gt(i64),
    /// Column is strictly less than the value.
    Lt(i64),
    /// Column differs from the value.
    Not(i64),
}

impl IntFilter {
    pub(crate) fn render(self, column: &str) -> Sql {
        match self {
            Self::Equals(value) => Sql::new(format!("{column} = ?"), vec![Bind::Int(value)]),
            Self::Gt(value) => Sql::new(format!("{column} > ?"), vec![Bind::Int(value)]),
            Self::Lt(value) => Sql::new(format!("{column} < ?"), vec![Bind::Int(value)]),
            Self::Not(value) => Sql::new(format!("{column} <> ?"), vec![Bind::Int(value)]),
        }
    }
}

/// One comparison against a text column.
///
/// `Contains` and `StartsWith` treat the needle literally: there are no
/// wildcard characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StringFilter {
    /// Column equals the value.
    Equals(String),
    /// Column differs from the value.
    Not(String),
    /// Column contains the value as a substring.
    Contains(String),
    /// Column starts with the value.
    StartsWith(String),
}

impl StringFilter {
    /// Equality comparison.
    pub fn equals(value: impl Into<String>) -> Self {
        Self::Equals(value.into())
    }

    /// Inequality comparison.
    pub fn not(value: impl Into<String>) -> Self {
        Self::Not(value.into())
    }

    /// Substring match.
    pub fn contains(value: impl Into<String>) -> Self {
        Self::Contains(value.into())
    }

    /// Prefix match.
    pub fn starts_with(value: impl Into<String>) -> Self {
        Self::StartsWith(value.into())
    }

    pub(crate) fn render(&self, column: &str) -> Sql {
        match self {
            Self::Equals(value) => {
                Sql::new(format!("{column} = ?"), vec![Bind::Text(value.clone())])
            }
            Self::Not(value) => {
                Sql::new(format!("{column} <> ?"), vec![Bind::Text(value.clone())])
            }
            // instr avoids LIKE wildcard escaping for literal needles.
            Self::Contains(value) => Sql::new(
                format!("instr({column}, ?) > 0"),
                vec![Bind::Text(value.clone())],
            ),
            // substr compares by character count, so the prefix length is
            // bound in characters rather than bytes.
            Self::StartsWith(value) => {
                let chars = i64::try_from(value.chars().count()).unwrap_or(i64::MAX);
                Sql::new(
                    format!("substr({column}, 1, ?) = ?"),
                    vec![Bind::Int(chars), Bind::Text(value.clone())],
                )
            }
        }
    }
}
