//! Record types for store operations.
//!
//! This module defines:
//! - Records returned by the store ([`User`], [`Preferences`], [`Post`])
//! - Insert payloads ([`NewUser`], [`NewPreferences`], [`NewPost`])
//! - Update payloads ([`UserUpdate`], [`PostUpdate`])
//! - Unique keys ([`UserKey`], [`PreferencesKey`])
//! - Field projections ([`UserSelect`], [`PreferencesSelect`])

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::query::{Bind, FieldValue, PostField, Sql, UserField};

/// A user record.
///
/// `preferences` and `posts` are `None` unless eager loading was requested;
/// an included `posts` is always `Some`, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Email address (unique).
    pub email: String,
    /// Display name. `(name, age)` is unique as a pair.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Optional role flag.
    pub role: Option<String>,
    /// Linked preferences, when eager-loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    /// Linked posts, when eager-loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
}

impl User {
    pub(crate) fn field_value(&self, field: UserField) -> FieldValue {
        match field {
            UserField::Id => FieldValue::Int(self.id),
            UserField::Email => FieldValue::Text(self.email.clone()),
            UserField::Name => FieldValue::Text(self.name.clone()),
            UserField::Age => FieldValue::Int(self.age),
            UserField::Role => self
                .role
                .as_ref()
                .map_or(FieldValue::Null, |role| FieldValue::Text(role.clone())),
        }
    }
}

/// A preferences record, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Unique identifier.
    pub id: i64,
    /// Owning user (unique; cascade-deleted with the user).
    pub user_id: i64,
    /// UI theme.
    pub theme: String,
}

/// A post record, belonging to exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier.
    pub id: i64,
    /// Authoring user.
    pub user_id: i64,
    /// Title.
    pub title: String,
    /// Optional body.
    pub content: Option<String>,
    /// Whether the post is published.
    pub published: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn field_value(&self, field: PostField) -> FieldValue {
        match field {
            PostField::Id => FieldValue::Int(self.id),
            PostField::UserId => FieldValue::Int(self.user_id),
            PostField::Title => FieldValue::Text(self.title.clone()),
            PostField::Published => FieldValue::Int(i64::from(self.published)),
            PostField::CreatedAt => FieldValue::Text(self.created_at.to_rfc3339()),
        }
    }
}

/// Insert payload for a user, optionally with a nested preferences create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Optional role flag.
    pub role: Option<String>,
    /// Preferences to create and link in the same operation.
    pub preferences: Option<NewPreferences>,
}

impl NewUser {
    /// Create an insert payload with the required fields.
    #[must_use]
    pub fn new(email: impl Into<String>, name: impl Into<String>, age: i64) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            age,
            role: None,
            preferences: None,
        }
    }

    /// Set the role flag.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Create and link a preferences record in the same operation.
    #[must_use]
    pub fn with_preferences(mut self, preferences: NewPreferences) -> Self {
        self.preferences = Some(preferences);
        self
    }
}

/// Insert payload for a nested preferences create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPreferences {
    /// UI theme.
    pub theme: String,
}

impl NewPreferences {
    /// Create an insert payload.
    #[must_use]
    pub fn new(theme: impl Into<String>) -> Self {
        Self { theme: theme.into() }
    }
}

/// Insert payload for a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    /// Authoring user.
    pub user_id: i64,
    /// Title.
    pub title: String,
    /// Optional body.
    pub content: Option<String>,
    /// Whether the post is published. Defaults to false.
    pub published: bool,
}

impl NewPost {
    /// Create an insert payload with the required fields.
    #[must_use]
    pub fn new(user_id: i64, title: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            content: None,
            published: false,
        }
    }

    /// Set the body.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the published flag.
    #[must_use]
    pub const fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }
}

/// Update payload for users. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    /// New email address.
    pub email: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New age.
    pub age: Option<i64>,
    /// New role flag.
    pub role: Option<String>,
}

impl UserUpdate {
    /// Set the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the age.
    #[must_use]
    pub const fn age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    /// Set the role flag.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// True if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.age.is_none() && self.role.is_none()
    }

    pub(crate) fn render_set(&self) -> Option<Sql> {
        let mut assignments = Vec::new();
        let mut binds = Vec::new();
        if let Some(email) = &self.email {
            assignments.push("email = ?");
            binds.push(Bind::Text(email.clone()));
        }
        if let Some(name) = &self.name {
            assignments.push("name = ?");
            binds.push(Bind::Text(name.clone()));
        }
        if let Some(age) = self.age {
            assignments.push("age = ?");
            binds.push(Bind::Int(age));
        }
        if let Some(role) = &self.role {
            assignments.push("role = ?");
            binds.push(Bind::Text(role.clone()));
        }
        if assignments.is_empty() {
            return None;
        }
        Some(Sql::new(assignments.join(", "), binds))
    }
}

/// Update payload for posts. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostUpdate {
    /// New title.
    pub title: Option<String>,
    /// New body.
    pub content: Option<String>,
    /// New published flag.
    pub published: Option<bool>,
}

impl PostUpdate {
    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the body.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the published flag.
    #[must_use]
    pub const fn published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }

    pub(crate) fn render_set(&self) -> Option<Sql> {
        let mut assignments = Vec::new();
        let mut binds = Vec::new();
        if let Some(title) = &self.title {
            assignments.push("title = ?");
            binds.push(Bind::Text(title.clone()));
        }
        if let Some(content) = &self.content {
            assignments.push("content = ?");
            binds.push(Bind::Text(content.clone()));
        }
        if let Some(published) = self.published {
            assignments.push("published = ?");
            binds.push(Bind::Bool(published));
        }
        if assignments.is_empty() {
            return None;
        }
        Some(Sql::new(assignments.join(", "), binds))
    }
}

/// A unique key identifying exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserKey {
    /// By primary key.
    Id(i64),
    /// By unique email.
    Email(String),
    /// By the composite `(name, age)` unique key.
    NameAge {
        /// Display name.
        name: String,
        /// Age in years.
        age: i64,
    },
}

impl UserKey {
    /// Key by unique email.
    pub fn email(email: impl Into<String>) -> Self {
        Self::Email(email.into())
    }

    /// Key by the composite `(name, age)` pair.
    pub fn name_age(name: impl Into<String>, age: i64) -> Self {
        Self::NameAge {
            name: name.into(),
            age,
        }
    }

    pub(crate) fn render(&self) -> Sql {
        match self {
            Self::Id(id) => Sql::new("id = ?", vec![Bind::Int(*id)]),
            Self::Email(email) => Sql::new("email = ?", vec![Bind::Text(email.clone())]),
            Self::NameAge { name, age } => Sql::new(
                "name = ? AND age = ?",
                vec![Bind::Text(name.clone()), Bind::Int(*age)],
            ),
        }
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
            Self::Email(email) => write!(f, "email={email}"),
            Self::NameAge { name, age } => write!(f, "name={name}, age={age}"),
        }
    }
}

/// A unique key identifying exactly one preferences record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreferencesKey {
    /// By primary key.
    Id(i64),
    /// By owning user (unique).
    UserId(i64),
}

impl PreferencesKey {
    pub(crate) fn render(self) -> Sql {
        match self {
            Self::Id(id) => Sql::new("id = ?", vec![Bind::Int(id)]),
            Self::UserId(user_id) => Sql::new("user_id = ?", vec![Bind::Int(user_id)]),
        }
    }
}

impl fmt::Display for PreferencesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
            Self::UserId(user_id) => write!(f, "user_id={user_id}"),
        }
    }
}

/// Projection of a user record to a subset of fields.
///
/// The projected output contains exactly the requested keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSelect {
    /// Include `id`.
    pub id: bool,
    /// Include `email`.
    pub email: bool,
    /// Include `name`.
    pub name: bool,
    /// Include `age`.
    pub age: bool,
    /// Include `role`.
    pub role: bool,
    /// Project the linked preferences record.
    pub preferences: Option<PreferencesSelect>,
}

impl UserSelect {
    /// Project a user to exactly the selected fields.
    #[must_use]
    pub fn project(&self, user: &User) -> Value {
        let mut out = Map::new();
        if self.id {
            out.insert("id".into(), json!(user.id));
        }
        if self.email {
            out.insert("email".into(), json!(user.email));
        }
        if self.name {
            out.insert("name".into(), json!(user.name));
        }
        if self.age {
            out.insert("age".into(), json!(user.age));
        }
        if self.role {
            out.insert("role".into(), json!(user.role));
        }
        if let Some(select) = &self.preferences {
            let value = user
                .preferences
                .as_ref()
                .map_or(Value::Null, |preferences| select.project(preferences));
            out.insert("preferences".into(), value);
        }
        Value::Object(out)
    }
}

/// Projection of a preferences record to a subset of fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesSelect {
    /// Include `id`.
    pub id: bool,
    /// Include `user_id`.
    pub user_id: bool,
    /// Include `theme`.
    pub theme: bool,
}

impl PreferencesSelect {
    /// Project a preferences record to exactly the selected fields.
    #[must_use]
    pub fn project(&self, preferences: &Preferences) -> Value {
        let mut out = Map::new();
        if self.id {
            out.insert("id".into(), json!(preferences.id));
        }
        if self.user_id {
            out.insert("userId".into(), json!(preferences.user_id));
        }
        if self.theme {
            out.insert("theme".into(), json!(preferences.theme));
        }
        Value::Object(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_user() -> User {
        User {
            id: 1,
            email: "alice@example.com".into(),
            name: "Alice".into(),
            age: 30,
            role: None,
            preferences: Some(Preferences {
                id: 7,
                user_id: 1,
                theme: "dark".into(),
            }),
            posts: None,
        }
    }

    #[test]
    fn test_new_user_builder() {
        let data = NewUser::new("a@x.com", "A", 25)
            .with_role("ADMIN")
            .with_preferences(NewPreferences::new("dark"));
        assert_eq!(data.email, "a@x.com");
        assert_eq!(data.role, Some("ADMIN".to_string()));
        assert_eq!(data.preferences, Some(NewPreferences::new("dark")));
    }

    #[test]
    fn test_user_update_render_set() {
        let set = UserUpdate::default()
            .age(26)
            .role("ADMIN")
            .render_set()
            .expect("set clause");
        assert_eq!(set.clause, "age = ?, role = ?");
        assert_eq!(set.binds.len(), 2);
    }

    #[test]
    fn test_empty_user_update_renders_nothing() {
        assert!(UserUpdate::default().is_empty());
        assert!(UserUpdate::default().render_set().is_none());
    }

    #[test]
    fn test_user_key_render_and_display() {
        let key = UserKey::name_age("me", 1);
        let sql = key.render();
        assert_eq!(sql.clause, "name = ? AND age = ?");
        assert_eq!(key.to_string(), "name=me, age=1");

        assert_eq!(UserKey::Id(7).to_string(), "id=7");
        assert_eq!(
            UserKey::email("a@x.com").to_string(),
            "email=a@x.com"
        );
    }

    #[test]
    fn test_preferences_key_render() {
        assert_eq!(PreferencesKey::UserId(3).render().clause, "user_id = ?");
        assert_eq!(PreferencesKey::Id(3).render().clause, "id = ?");
    }

    #[test]
    fn test_user_select_projects_exact_fields() {
        let select = UserSelect {
            id: true,
            name: true,
            preferences: Some(PreferencesSelect {
                theme: true,
                ..PreferencesSelect::default()
            }),
            ..UserSelect::default()
        };

        let projected = select.project(&sample_user());
        assert_eq!(
            projected,
            json!({ "id": 1, "name": "Alice", "preferences": { "theme": "dark" } })
        );
    }

    #[test]
    fn test_user_select_missing_preferences_projects_null() {
        let mut user = sample_user();
        user.preferences = None;

        let select = UserSelect {
            id: true,
            preferences: Some(PreferencesSelect {
                theme: true,
                ..PreferencesSelect::default()
            }),
            ..UserSelect::default()
        };

        let projected = select.project(&user);
        assert_eq!(projected, json!({ "id": 1, "preferences": null }));
    }

    #[test]
    fn test_field_value_extraction() {
        let user = sample_user();
        assert_eq!(user.field_value(UserField::Name), FieldValue::Text("Alice".into()));
        assert_eq!(user.field_value(UserField::Age), FieldValue::Int(30));
        assert_eq!(user.field_value(UserField::Role), FieldValue::Null);
    }

    #[test]
    fn test_user_serializes_without_unloaded_relations() {
        let mut user = sample_user();
        user.preferences = None;
        let json = serde_json::to_value(&user).expect("serialize");
        assert!(json.get("preferences").is_none());
        assert!(json.get("posts").is_none());
    }
}
