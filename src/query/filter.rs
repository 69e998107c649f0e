//! Per-entity filter predicates.
//!
//! A filter is the typed equivalent of the source scripts' `where` objects:
//! every present field term must match (conjunction), `or` terms form one
//! disjunction group, and relation terms constrain linked records through
//! correlated `EXISTS` subqueries.

use serde::{Deserialize, Serialize};

use super::scalar::{IntFilter, StringFilter};
use super::sql::{Bind, Sql};

/// Filter over `User` records.
///
/// The empty (default) filter matches every user.
///
/// # Example
///
/// ```
/// use record_store::query::{IntFilter, StringFilter, UserFilter};
///
/// // age > 1 AND age < 30 AND age <> 25 AND (contains "e" OR starts with "J")
/// let filter = UserFilter::default()
///     .age(IntFilter::Gt(1))
///     .age(IntFilter::Lt(30))
///     .age(IntFilter::Not(25))
///     .or(UserFilter::default().name(StringFilter::contains("e")))
///     .or(UserFilter::default().name(StringFilter::starts_with("J")));
/// # let _ = filter;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserFilter {
    /// Terms on the `id` column.
    pub id: Vec<IntFilter>,
    /// Terms on the `email` column.
    pub email: Vec<StringFilter>,
    /// Terms on the `name` column.
    pub name: Vec<StringFilter>,
    /// Terms on the `age` column.
    pub age: Vec<IntFilter>,
    /// Terms on the `role` column.
    pub role: Vec<StringFilter>,
    /// The user's preferences record must exist and match (`is`).
    pub preferences: Option<Box<PreferencesFilter>>,
    /// At least one of the user's posts must match (`some`).
    pub posts_some: Option<Box<PostFilter>>,
    /// Nested filters, all of which must match.
    pub and: Vec<UserFilter>,
    /// Nested filters, at least one of which must match.
    pub or: Vec<UserFilter>,
}

impl UserFilter {
    /// Add a term on `id`.
    #[must_use]
    pub fn id(mut self, term: IntFilter) -> Self {
        self.id.push(term);
        self
    }

    /// Add a term on `email`.
    #[must_use]
    pub fn email(mut self, term: StringFilter) -> Self {
        self.email.push(term);
        self
    }

    /// Add a term on `name`.
    #[must_use]
    pub fn name(mut self, term: StringFilter) -> Self {
        self.name.push(term);
        self
    }

    /// Add a term on `age`.
    #[must_use]
    pub fn age(mut self, term: IntFilter) -> Self {
        self.age.push(term);
        self
    }

    /// Add a term on `role`.
    #[must_use]
    pub fn role(mut self, term: StringFilter) -> Self {
        self.role.push(term);
        self
    }

    /// Require the linked preferences record to match.
    #[must_use]
    pub fn preferences(mut self, filter: PreferencesFilter) -> Self {
        self.preferences = Some(Box::new(filter));
        self
    }

    /// Require at least one linked post to match.
    #[must_use]
    pub fn posts_some(mut self, filter: PostFilter) -> Self {
        self.posts_some = Some(Box::new(filter));
        self
    }

    /// Add a nested filter that must also match.
    #[must_use]
    pub fn and(mut self, filter: Self) -> Self {
        self.and.push(filter);
        self
    }

    /// Add a nested filter to the disjunction group.
    #[must_use]
    pub fn or(mut self, filter: Self) -> Self {
        self.or.push(filter);
        self
    }

    /// True if no term is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
            && self.email.is_empty()
            && self.name.is_empty()
            && self.age.is_empty()
            && self.role.is_empty()
            && self.preferences.is_none()
            && self.posts_some.is_none()
            && self.and.is_empty()
            && self.or.is_empty()
    }

    /// Render to a `WHERE` fragment with columns qualified by `alias`.
    pub(crate) fn render(&self, alias: &str) -> Sql {
        let mut parts = Vec::new();

        for term in &self.id {
            parts.push(term.render(&format!("{alias}.id")));
        }
        for term in &self.email {
            parts.push(term.render(&format!("{alias}.email")));
        }
        for term in &self.name {
            parts.push(term.render(&format!("{alias}.name")));
        }
        for term in &self.age {
            parts.push(term.render(&format!("{alias}.age")));
        }
        for term in &self.role {
            parts.push(term.render(&format!("{alias}.role")));
        }

        if let Some(preferences) = &self.preferences {
            let inner = preferences.render("p");
            parts.push(Sql::new(
                format!(
                    "EXISTS (SELECT 1 FROM preferences p WHERE p.user_id = {alias}.id AND {})",
                    inner.clause
                ),
                inner.binds,
            ));
        }

        if let Some(posts) = &self.posts_some {
            let inner = posts.render("q");
            parts.push(Sql::new(
                format!(
                    "EXISTS (SELECT 1 FROM posts q WHERE q.user_id = {alias}.id AND {})",
                    inner.clause
                ),
                inner.binds,
            ));
        }

        for nested in &self.and {
            parts.push(nested.render(alias));
        }

        if !self.or.is_empty() {
            parts.push(Sql::or_group(
                self.or.iter().map(|nested| nested.render(alias)).collect(),
            ));
        }

        Sql::and_group(parts)
    }
}

/// Filter over `Preferences` records.
///
/// The empty (default) filter matches every preferences record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferencesFilter {
    /// Terms on the `id` column.
    pub id: Vec<IntFilter>,
    /// Terms on the `user_id` column.
    pub user_id: Vec<IntFilter>,
    /// Terms on the `theme` column.
    pub theme: Vec<StringFilter>,
}

impl PreferencesFilter {
    /// Add a term on `id`.
    #[must_use]
    pub fn id(mut self, term: IntFilter) -> Self {
        self.id.push(term);
        self
    }

    /// Add a term on `user_id`.
    #[must_use]
    pub fn user_id(mut self, term: IntFilter) -> Self {
        self.user_id.push(term);
        self
    }

    /// Add a term on `theme`.
    #[must_use]
    pub fn theme(mut self, term: StringFilter) -> Self {
        self.theme.push(term);
        self
    }

    pub(crate) fn render(&self, alias: &str) -> Sql {
        let mut parts = Vec::new();
        for term in &self.id {
            parts.push(term.render(&format!("{alias}.id")));
        }
        for term in &self.user_id {
            parts.push(term.render(&format!("{alias}.user_id")));
        }
        for term in &self.theme {
            parts.push(term.render(&format!("{alias}.theme")));
        }
        Sql::and_group(parts)
    }
}

/// Filter over `Post` records.
///
/// The empty (default) filter matches every post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostFilter {
    /// Terms on the `id` column.
    pub id: Vec<IntFilter>,
    /// Terms on the `user_id` column.
    pub user_id: Vec<IntFilter>,
    /// Terms on the `title` column.
    pub title: Vec<StringFilter>,
    /// Required value of the `published` flag.
    pub published: Option<bool>,
    /// Nested filters, all of which must match.
    pub and: Vec<PostFilter>,
    /// Nested filters, at least one of which must match.
    pub or: Vec<PostFilter>,
}

impl PostFilter {
    /// Add a term on `id`.
    #[must_use]
    pub fn id(mut self, term: IntFilter) -> Self {
        self.id.push(term);
        self
    }

    /// Add a term on `user_id`.
    #[must_use]
    pub fn user_id(mut self, term: IntFilter) -> Self {
        self.user_id.push(term);
        self
    }

    /// Add a term on `title`.
    #[must_use]
    pub fn title(mut self, term: StringFilter) -> Self {
        self.title.push(term);
        self
    }

    /// Require the `published` flag to equal `value`.
    #[must_use]
    pub const fn published(mut self, value: bool) -> Self {
        self.published = Some(value);
        self
    }

    /// Add a nested filter that must also match.
    #[must_use]
    pub fn and(mut self, filter: Self) -> Self {
        self.and.push(filter);
        self
    }

    /// Add a nested filter to the disjunction group.
    #[must_use]
    pub fn or(mut self, filter: Self) -> Self {
        self.or.push(filter);
        self
    }

    pub(crate) fn render(&self, alias: &str) -> Sql {
        let mut parts = Vec::new();
        for term in &self.id {
            parts.push(term.render(&format!("{alias}.id")));
        }
        for term in &self.user_id {
            parts.push(term.render(&format!("{alias}.user_id")));
        }
        for term in &self.title {
            parts.push(term.render(&format!("{alias}.title")));
        }
        if let Some(published) = self.published {
            parts.push(Sql::new(
                format!("{alias}.published = ?"),
                vec![Bind::Bool(published)],
            ));
        }
        for nested in &self.and {
            parts.push(nested.render(alias));
        }
        if !self.or.is_empty() {
            parts.push(Sql::or_group(
                self.or.iter().map(|nested| nested.render(alias)).collect(),
            ));
        }
        Sql::and_group(parts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_empty_filter_matches_all() {
        let sql = UserFilter::default().render("users");
        assert_eq!(sql.clause, "1=1");
        assert!(sql.binds.is_empty());
    }

    #[test]
    fn test_is_empty() {
        assert!(UserFilter::default().is_empty());
        assert!(!UserFilter::default().age(IntFilter::Equals(25)).is_empty());
    }

    #[test]
    fn test_single_term() {
        let sql = UserFilter::default()
            .age(IntFilter::Equals(25))
            .render("users");
        assert_eq!(sql.clause, "users.age = ?");
        assert_eq!(sql.binds, vec![Bind::Int(25)]);
    }

    #[test]
    fn test_multiple_terms_conjoined() {
        let sql = UserFilter::default()
            .age(IntFilter::Gt(1))
            .age(IntFilter::Lt(30))
            .age(IntFilter::Not(25))
            .render("users");
        assert_eq!(
            sql.clause,
            "(users.age > ? AND users.age < ? AND users.age <> ?)"
        );
        assert_eq!(sql.binds.len(), 3);
    }

    #[test]
    fn test_or_group_renders_disjunction() {
        let sql = UserFilter::default()
            .age(IntFilter::Equals(25))
            .or(UserFilter::default().name(StringFilter::contains("e")))
            .or(UserFilter::default().name(StringFilter::starts_with("J")))
            .render("users");
        assert_eq!(
            sql.clause,
            "(users.age = ? AND (instr(users.name, ?) > 0 OR substr(users.name, 1, ?) = ?))"
        );
        assert_eq!(sql.binds.len(), 4);
    }

    #[test]
    fn test_preferences_relation_renders_exists() {
        let sql = UserFilter::default()
            .preferences(PreferencesFilter::default().theme(StringFilter::equals("dark")))
            .render("users");
        assert_eq!(
            sql.clause,
            "EXISTS (SELECT 1 FROM preferences p WHERE p.user_id = users.id AND p.theme = ?)"
        );
        assert_eq!(sql.binds, vec![Bind::Text("dark".into())]);
    }

    #[test]
    fn test_posts_relation_renders_exists() {
        let sql = UserFilter::default()
            .posts_some(PostFilter::default().published(true))
            .render("users");
        assert_eq!(
            sql.clause,
            "EXISTS (SELECT 1 FROM posts q WHERE q.user_id = users.id AND q.published = ?)"
        );
        assert_eq!(sql.binds, vec![Bind::Bool(true)]);
    }

    #[test]
    fn test_nested_and_filters() {
        let sql = UserFilter::default()
            .and(UserFilter::default().age(IntFilter::Gt(1)))
            .and(
                UserFilter::default()
                    .or(UserFilter::default().name(StringFilter::contains("e")))
                    .or(UserFilter::default().name(StringFilter::starts_with("J"))),
            )
            .render("users");
        assert_eq!(
            sql.clause,
            "(users.age > ? AND (instr(users.name, ?) > 0 OR substr(users.name, 1, ?) = ?))"
        );
    }

    #[test]
    fn test_post_filter_title_and_published() {
        let sql = PostFilter::default()
            .title(StringFilter::contains("intro"))
            .published(false)
            .render("posts");
        assert_eq!(
            sql.clause,
            "(instr(posts.title, ?) > 0 AND posts.published = ?)"
        );
    }

    fn arb_int_terms() -> impl Strategy<Value = Vec<IntFilter>> {
        prop::collection::vec(
            prop_oneof![
                any::<i64>().prop_map(IntFilter::Equals),
                any::<i64>().prop_map(IntFilter::Gt),
                any::<i64>().prop_map(IntFilter::Lt),
                any::<i64>().prop_map(IntFilter::Not),
            ],
            0..4,
        )
    }

    fn arb_string_terms() -> impl Strategy<Value = Vec<StringFilter>> {
        prop::collection::vec(
            prop_oneof![
                "[a-zA-Z@.%_]{0,12}".prop_map(StringFilter::Equals),
                "[a-zA-Z@.%_]{0,12}".prop_map(StringFilter::Not),
                "[a-zA-Z@.%_]{0,12}".prop_map(StringFilter::Contains),
                "[a-zA-Z@.%_]{0,12}".prop_map(StringFilter::StartsWith),
            ],
            0..4,
        )
    }

    proptest! {
        // The placeholder/bind invariant must hold for any filter shape.
        #[test]
        fn prop_placeholder_count_matches_binds(
            ages in arb_int_terms(),
            names in arb_string_terms(),
            emails in arb_string_terms(),
            or_names in arb_string_terms(),
        ) {
            let mut filter = UserFilter { age: ages, name: names, email: emails, ..UserFilter::default() };
            for term in or_names {
                filter = filter.or(UserFilter::default().name(term));
            }
            let sql = filter.render("users");
            prop_assert_eq!(sql.clause.matches('?').count(), sql.binds.len());
            prop_assert_eq!(
                sql.clause.matches('(').count(),
                sql.clause.matches(')').count()
            );
        }
    }
}
