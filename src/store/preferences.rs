//! Preferences store operations.
//!
//! Preferences have no independent lifecycle: they are created through a
//! nested create on the owning user and removed by cascade when the user
//! is deleted. Only lookup and theme updates are exposed here.

#![allow(clippy::missing_errors_doc)]

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::StoreError;
use crate::query::{bind_values, PreferencesFilter};

use super::core::RecordStore;
use super::types::{Preferences, PreferencesKey};

impl RecordStore {
    /// Get exactly one preferences record by unique key.
    ///
    /// Returns `Ok(None)` if no record matches; never an error.
    pub async fn find_unique_preferences(
        &self,
        key: PreferencesKey,
    ) -> Result<Option<Preferences>, StoreError> {
        let key_sql = key.render();
        let sql = format!(
            "SELECT id, user_id, theme FROM preferences WHERE {}",
            key_sql.clause
        );

        let row = bind_values(sqlx::query(&sql), &key_sql.binds)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT preferences", format!("{e}")))?;

        Ok(row.as_ref().map(Self::row_to_preferences))
    }

    /// Get all preferences records matching the filter, ordered by id.
    pub async fn find_many_preferences(
        &self,
        filter: &PreferencesFilter,
    ) -> Result<Vec<Preferences>, StoreError> {
        let filter_sql = filter.render("preferences");
        let sql = format!(
            "SELECT id, user_id, theme FROM preferences WHERE {} ORDER BY id ASC",
            filter_sql.clause
        );

        let rows = bind_values(sqlx::query(&sql), &filter_sql.binds)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT preferences", format!("{e}")))?;

        Ok(rows.iter().map(Self::row_to_preferences).collect())
    }

    /// Change the theme of exactly one preferences record.
    ///
    /// Fails with [`StoreError::NotFound`] if no record matches the key.
    pub async fn update_preferences(
        &self,
        key: PreferencesKey,
        theme: impl Into<String> + Send,
    ) -> Result<Preferences, StoreError> {
        let theme = theme.into();
        let key_sql = key.render();
        let sql = format!("UPDATE preferences SET theme = ? WHERE {}", key_sql.clause);

        let mut query = sqlx::query(&sql).bind(&theme);
        query = bind_values(query, &key_sql.binds);
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| Self::write_error("UPDATE preferences", &e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Preferences",
                key: key.to_string(),
            });
        }

        self.find_unique_preferences(key)
            .await?
            .ok_or_else(|| StoreError::Internal {
                message: format!("updated preferences {key} disappeared"),
            })
    }

    /// Convert a database row to a `Preferences`.
    pub(crate) fn row_to_preferences(row: &SqliteRow) -> Preferences {
        Preferences {
            id: row.get("id"),
            user_id: row.get("user_id"),
            theme: row.get("theme"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::core::tests::test_store;
    use crate::store::types::{NewPreferences, NewUser, UserKey};
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    async fn seed_user_with_preferences(store: &RecordStore) -> i64 {
        store
            .create_user(
                NewUser::new("a@x.com", "A", 25).with_preferences(NewPreferences::new("dark")),
            )
            .await
            .expect("seed user")
            .id
    }

    #[tokio::test]
    #[serial]
    async fn test_find_unique_preferences_by_user_id() {
        let store = test_store().await;
        let user_id = seed_user_with_preferences(&store).await;

        let preferences = store
            .find_unique_preferences(PreferencesKey::UserId(user_id))
            .await
            .expect("query")
            .expect("exists");
        assert_eq!(preferences.theme, "dark");
    }

    #[tokio::test]
    #[serial]
    async fn test_find_unique_preferences_by_id() {
        let store = test_store().await;
        let user_id = seed_user_with_preferences(&store).await;

        let by_user = store
            .find_unique_preferences(PreferencesKey::UserId(user_id))
            .await
            .expect("query")
            .expect("exists");
        let by_id = store
            .find_unique_preferences(PreferencesKey::Id(by_user.id))
            .await
            .expect("query")
            .expect("exists");
        assert_eq!(by_user, by_id);
    }

    #[tokio::test]
    #[serial]
    async fn test_find_unique_preferences_not_found_is_none() {
        let store = test_store().await;
        let result = store
            .find_unique_preferences(PreferencesKey::UserId(99))
            .await
            .expect("query must not fail");
        assert!(result.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_update_preferences() {
        let store = test_store().await;
        let user_id = seed_user_with_preferences(&store).await;

        let updated = store
            .update_preferences(PreferencesKey::UserId(user_id), "light")
            .await
            .expect("update");
        assert_eq!(updated.theme, "light");
    }

    #[tokio::test]
    #[serial]
    async fn test_update_preferences_not_found() {
        let store = test_store().await;
        let result = store
            .update_preferences(PreferencesKey::UserId(99), "light")
            .await;
        assert!(matches!(
            result,
            Err(StoreError::NotFound {
                entity: "Preferences",
                ..
            })
        ));
    }

    #[tokio::test]
    #[serial]
    async fn test_cascade_delete_with_owner() {
        let store = test_store().await;
        let user_id = seed_user_with_preferences(&store).await;

        store
            .delete_user(&UserKey::Id(user_id))
            .await
            .expect("delete user");

        let orphan = store
            .find_unique_preferences(PreferencesKey::UserId(user_id))
            .await
            .expect("query");
        assert!(orphan.is_none());
    }
}
