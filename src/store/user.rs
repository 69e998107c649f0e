//! User store operations.

#![allow(clippy::missing_errors_doc)]

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::StoreError;
use crate::query::{bind_values, distinct_by, paginate, Bind, SortOrder, UserField, UserFilter, UserInclude, UserQuery};

use super::core::RecordStore;
use super::types::{NewUser, Post, Preferences, User, UserKey, UserUpdate};

const USER_COLUMNS: &str = "id, email, name, age, role";

impl RecordStore {
    /// Insert a new user, optionally creating and linking a preferences
    /// record in the same transaction.
    ///
    /// Fails with [`StoreError::ConstraintViolation`] if the email or the
    /// `(name, age)` pair is already taken.
    pub async fn create_user(&self, data: NewUser) -> Result<User, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::query_error("BEGIN", format!("{e}")))?;

        let result = sqlx::query("INSERT INTO users (email, name, age, role) VALUES (?, ?, ?, ?)")
            .bind(&data.email)
            .bind(&data.name)
            .bind(data.age)
            .bind(&data.role)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::write_error("INSERT users", &e))?;
        let user_id = result.last_insert_rowid();

        let preferences = match &data.preferences {
            Some(nested) => {
                let result = sqlx::query("INSERT INTO preferences (user_id, theme) VALUES (?, ?)")
                    .bind(user_id)
                    .bind(&nested.theme)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| Self::write_error("INSERT preferences", &e))?;
                Some(Preferences {
                    id: result.last_insert_rowid(),
                    user_id,
                    theme: nested.theme.clone(),
                })
            }
            None => None,
        };

        tx.commit()
            .await
            .map_err(|e| Self::query_error("COMMIT", format!("{e}")))?;

        Ok(User {
            id: user_id,
            email: data.email,
            name: data.name,
            age: data.age,
            role: data.role,
            preferences,
            posts: None,
        })
    }

    /// Get exactly one user by unique key.
    ///
    /// Returns `Ok(None)` if no user matches; never an error.
    pub async fn find_unique_user(&self, key: &UserKey) -> Result<Option<User>, StoreError> {
        let key_sql = key.render();
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {}", key_sql.clause);

        let row = bind_values(sqlx::query(&sql), &key_sql.binds)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT users", format!("{e}")))?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    /// Get the first user matching the filter under the stable default
    /// ordering (`id ASC`).
    pub async fn find_first_user(&self, filter: &UserFilter) -> Result<Option<User>, StoreError> {
        let filter_sql = filter.render("users");
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {} ORDER BY id ASC LIMIT 1",
            filter_sql.clause
        );

        let row = bind_values(sqlx::query(&sql), &filter_sql.binds)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT users", format!("{e}")))?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    /// Get all users matching the query.
    ///
    /// Rows are ordered first; with `distinct`, the first row per distinct
    /// key survives and the skip/take window applies afterwards. Without
    /// `distinct`, the window is pushed down to the database.
    pub async fn find_many_users(&self, query: &UserQuery) -> Result<Vec<User>, StoreError> {
        let filter_sql = query.filter.render("users");
        let mut sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {} ORDER BY {}",
            filter_sql.clause,
            Self::user_order_clause(query.order_by)
        );
        let mut binds = filter_sql.binds;

        let in_db_window = query.distinct.is_empty();
        if in_db_window && (query.skip.is_some() || query.take.is_some()) {
            sql.push_str(" LIMIT ? OFFSET ?");
            // LIMIT -1 means "no limit" in SQLite.
            binds.push(Bind::Int(
                query
                    .take
                    .map_or(-1, |take| i64::try_from(take).unwrap_or(i64::MAX)),
            ));
            binds.push(Bind::Int(
                query
                    .skip
                    .map_or(0, |skip| i64::try_from(skip).unwrap_or(i64::MAX)),
            ));
        }

        let rows = bind_values(sqlx::query(&sql), &binds)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT users", format!("{e}")))?;

        let mut users: Vec<User> = rows.iter().map(Self::row_to_user).collect();

        if !in_db_window {
            users = distinct_by(users, |user| {
                query
                    .distinct
                    .iter()
                    .map(|field| user.field_value(*field))
                    .collect()
            });
            users = paginate(users, query.skip, query.take);
        }

        self.attach_relations(&mut users, query.include).await?;
        Ok(users)
    }

    /// Mutate exactly one user matched by unique key; returns the updated
    /// record.
    ///
    /// Fails with [`StoreError::NotFound`] if no user matches and with
    /// [`StoreError::ConstraintViolation`] if the update breaks a
    /// uniqueness rule.
    pub async fn update_user(&self, key: &UserKey, update: &UserUpdate) -> Result<User, StoreError> {
        // Resolve the id first: the update may change the key fields.
        let existing = self
            .find_unique_user(key)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "User",
                key: key.to_string(),
            })?;

        let Some(set) = update.render_set() else {
            return Ok(existing);
        };

        let sql = format!("UPDATE users SET {} WHERE id = ?", set.clause);
        let mut binds = set.binds;
        binds.push(Bind::Int(existing.id));

        bind_values(sqlx::query(&sql), &binds)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::write_error("UPDATE users", &e))?;

        self.find_unique_user(&UserKey::Id(existing.id))
            .await?
            .ok_or_else(|| StoreError::Internal {
                message: format!("updated user {} disappeared", existing.id),
            })
    }

    /// Mutate all users matching the filter; returns the number of
    /// affected records. Zero matches is not an error.
    pub async fn update_many_users(
        &self,
        filter: &UserFilter,
        update: &UserUpdate,
    ) -> Result<u64, StoreError> {
        let Some(set) = update.render_set() else {
            return Ok(0);
        };

        let filter_sql = filter.render("users");
        let sql = format!(
            "UPDATE users SET {} WHERE id IN (SELECT users.id FROM users WHERE {})",
            set.clause, filter_sql.clause
        );
        let mut binds = set.binds;
        binds.extend(filter_sql.binds);

        let result = bind_values(sqlx::query(&sql), &binds)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::write_error("UPDATE users", &e))?;

        Ok(result.rows_affected())
    }

    /// Remove exactly one user by unique key; returns the removed record.
    /// Linked preferences and posts are cascade-deleted.
    ///
    /// Fails with [`StoreError::NotFound`] if no user matches.
    pub async fn delete_user(&self, key: &UserKey) -> Result<User, StoreError> {
        let existing = self
            .find_unique_user(key)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "User",
                key: key.to_string(),
            })?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(existing.id)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::query_error("DELETE users", format!("{e}")))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "User",
                key: key.to_string(),
            });
        }

        Ok(existing)
    }

    /// Remove all users matching the filter; returns the number of removed
    /// records. The empty filter removes every user.
    pub async fn delete_many_users(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let filter_sql = filter.render("users");
        let sql = format!(
            "DELETE FROM users WHERE id IN (SELECT users.id FROM users WHERE {})",
            filter_sql.clause
        );

        let result = bind_values(sqlx::query(&sql), &filter_sql.binds)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::query_error("DELETE users", format!("{e}")))?;

        Ok(result.rows_affected())
    }

    fn user_order_clause(order_by: Option<(UserField, SortOrder)>) -> String {
        match order_by {
            // Secondary id sort keeps the order (and therefore the distinct
            // representative) deterministic on ties.
            Some((field, order)) if field != UserField::Id => {
                format!("{} {}, id ASC", field.column(), order.as_sql())
            }
            Some((_, order)) => format!("id {}", order.as_sql()),
            None => "id ASC".to_string(),
        }
    }

    async fn attach_relations(
        &self,
        users: &mut [User],
        include: UserInclude,
    ) -> Result<(), StoreError> {
        if include.preferences {
            self.load_user_preferences(users).await?;
        }
        if include.posts {
            self.load_user_posts(users).await?;
        }
        Ok(())
    }

    async fn load_user_preferences(&self, users: &mut [User]) -> Result<(), StoreError> {
        if users.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; users.len()].join(", ");
        let sql =
            format!("SELECT id, user_id, theme FROM preferences WHERE user_id IN ({placeholders})");

        let mut query = sqlx::query(&sql);
        for user in users.iter() {
            query = query.bind(user.id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT preferences", format!("{e}")))?;

        let mut by_user: HashMap<i64, Preferences> = HashMap::new();
        for row in &rows {
            let preferences = Self::row_to_preferences(row);
            by_user.insert(preferences.user_id, preferences);
        }

        for user in users.iter_mut() {
            user.preferences = by_user.remove(&user.id);
        }
        Ok(())
    }

    async fn load_user_posts(&self, users: &mut [User]) -> Result<(), StoreError> {
        if users.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; users.len()].join(", ");
        let sql = format!(
            "SELECT id, user_id, title, content, published, created_at \
             FROM posts WHERE user_id IN ({placeholders}) ORDER BY id ASC"
        );

        let mut query = sqlx::query(&sql);
        for user in users.iter() {
            query = query.bind(user.id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT posts", format!("{e}")))?;

        let mut by_user: HashMap<i64, Vec<Post>> = HashMap::new();
        for row in &rows {
            let post = Self::row_to_post(row)?;
            by_user.entry(post.user_id).or_default().push(post);
        }

        for user in users.iter_mut() {
            user.posts = Some(by_user.remove(&user.id).unwrap_or_default());
        }
        Ok(())
    }

    /// Convert a database row to a `User` (relations not loaded).
    fn row_to_user(row: &SqliteRow) -> User {
        User {
            id: row.get("id"),
            email: row.get("email"),
            name: row.get("name"),
            age: row.get("age"),
            role: row.get("role"),
            preferences: None,
            posts: None,
        }
    }
}
