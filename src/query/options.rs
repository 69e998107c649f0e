//! Query options: sort, pagination, distinct, and eager loading.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::filter::{PostFilter, UserFilter};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    pub(crate) const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A sortable/distinct-able `User` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserField {
    /// The `id` column.
    Id,
    /// The `email` column.
    Email,
    /// The `name` column.
    Name,
    /// The `age` column.
    Age,
    /// The `role` column.
    Role,
}

impl UserField {
    pub(crate) const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Email => "email",
            Self::Name => "name",
            Self::Age => "age",
            Self::Role => "role",
        }
    }
}

/// A sortable/distinct-able `Post` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostField {
    /// The `id` column.
    Id,
    /// The `user_id` column.
    UserId,
    /// The `title` column.
    Title,
    /// The `published` column.
    Published,
    /// The `created_at` column.
    CreatedAt,
}

impl PostField {
    pub(crate) const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::Title => "title",
            Self::Published => "published",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Which related records to eager-load onto returned users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInclude {
    /// Load the linked preferences record.
    pub preferences: bool,
    /// Load the linked posts.
    pub posts: bool,
}

/// Options for a many-user query.
///
/// Semantics follow the source scripts: rows are filtered, then ordered
/// (by `id ASC` when no explicit sort is given), then — when `distinct` is
/// requested — reduced to the first row per distinct key, and finally the
/// `skip`/`take` window is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserQuery {
    /// Row filter. Empty matches all users.
    pub filter: UserFilter,
    /// Explicit sort key and direction.
    pub order_by: Option<(UserField, SortOrder)>,
    /// Number of leading rows to drop.
    pub skip: Option<u64>,
    /// Maximum number of rows to return.
    pub take: Option<u64>,
    /// Keep only the first row per distinct value of these fields.
    pub distinct: Vec<UserField>,
    /// Related records to eager-load.
    pub include: UserInclude,
}

impl UserQuery {
    /// Set the row filter.
    #[must_use]
    pub fn filter(mut self, filter: UserFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the sort key and direction.
    #[must_use]
    pub const fn order_by(mut self, field: UserField, order: SortOrder) -> Self {
        self.order_by = Some((field, order));
        self
    }

    /// Drop the first `count` rows.
    #[must_use]
    pub const fn skip(mut self, count: u64) -> Self {
        self.skip = Some(count);
        self
    }

    /// Return at most `count` rows.
    #[must_use]
    pub const fn take(mut self, count: u64) -> Self {
        self.take = Some(count);
        self
    }

    /// Keep only the first row per distinct value of `fields`.
    #[must_use]
    pub fn distinct(mut self, fields: impl IntoIterator<Item = UserField>) -> Self {
        self.distinct = fields.into_iter().collect();
        self
    }

    /// Eager-load the linked preferences record.
    #[must_use]
    pub const fn include_preferences(mut self) -> Self {
        self.include.preferences = true;
        self
    }

    /// Eager-load the linked posts.
    #[must_use]
    pub const fn include_posts(mut self) -> Self {
        self.include.posts = true;
        self
    }
}

/// Options for a many-post query. Same semantics as [`UserQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostQuery {
    /// Row filter. Empty matches all posts.
    pub filter: PostFilter,
    /// Explicit sort key and direction.
    pub order_by: Option<(PostField, SortOrder)>,
    /// Number of leading rows to drop.
    pub skip: Option<u64>,
    /// Maximum number of rows to return.
    pub take: Option<u64>,
    /// Keep only the first row per distinct value of these fields.
    pub distinct: Vec<PostField>,
}

impl PostQuery {
    /// Set the row filter.
    #[must_use]
    pub fn filter(mut self, filter: PostFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the sort key and direction.
    #[must_use]
    pub const fn order_by(mut self, field: PostField, order: SortOrder) -> Self {
        self.order_by = Some((field, order));
        self
    }

    /// Drop the first `count` rows.
    #[must_use]
    pub const fn skip(mut self, count: u64) -> Self {
        self.skip = Some(count);
        self
    }

    /// Return at most `count` rows.
    #[must_use]
    pub const fn take(mut self, count: u64) -> Self {
        self.take = Some(count);
        self
    }

    /// Keep only the first row per distinct value of `fields`.
    #[must_use]
    pub fn distinct(mut self, fields: impl IntoIterator<Item = PostField>) -> Self {
        self.distinct = fields.into_iter().collect();
        self
    }
}

/// A comparable snapshot of one record field, used as a distinct key part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum FieldValue {
    Int(i64),
    Text(String),
    Null,
}

/// Keep the first row per distinct key, preserving input order.
pub(crate) fn distinct_by<T>(rows: Vec<T>, key: impl Fn(&T) -> Vec<FieldValue>) -> Vec<T> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(key(row)))
        .collect()
}

/// Apply the skip/take window to already-ordered rows.
pub(crate) fn paginate<T>(rows: Vec<T>, skip: Option<u64>, take: Option<u64>) -> Vec<T> {
    let skip = usize::try_from(skip.unwrap_or(0)).unwrap_or(usize::MAX);
    let take = take
        .map_or(usize::MAX, |t| usize::try_from(t).unwrap_or(usize::MAX));
    rows.into_iter().skip(skip).take(take).collect()
}
