//! Post store operations.

#![allow(clippy::missing_errors_doc)]

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::StoreError;
use crate::query::{bind_values, distinct_by, paginate, Bind, PostField, PostFilter, PostQuery, SortOrder};

use super::core::RecordStore;
use super::types::{NewPost, Post, PostUpdate};

const POST_COLUMNS: &str = "id, user_id, title, content, published, created_at";

impl RecordStore {
    /// Insert a new post for an existing user.
    pub async fn create_post(&self, data: NewPost) -> Result<Post, StoreError> {
        let created_at = Utc::now();
        let created_at_str = created_at.to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO posts (user_id, title, content, published, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(data.user_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.published)
        .bind(&created_at_str)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::write_error("INSERT posts", &e))?;

        Ok(Post {
            id: result.last_insert_rowid(),
            user_id: data.user_id,
            title: data.title,
            content: data.content,
            published: data.published,
            created_at,
        })
    }

    /// Get exactly one post by id.
    ///
    /// Returns `Ok(None)` if no post matches; never an error.
    pub async fn find_unique_post(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT posts", format!("{e}")))?;

        match row {
            Some(row) => Ok(Some(Self::row_to_post(&row)?)),
            None => Ok(None),
        }
    }

    /// Get all posts matching the query.
    ///
    /// Same ordering/distinct/window semantics as
    /// [`RecordStore::find_many_users`].
    pub async fn find_many_posts(&self, query: &PostQuery) -> Result<Vec<Post>, StoreError> {
        let filter_sql = query.filter.render("posts");
        let mut sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE {} ORDER BY {}",
            filter_sql.clause,
            Self::post_order_clause(query.order_by)
        );
        let mut binds = filter_sql.binds;

        let in_db_window = query.distinct.is_empty();
        if in_db_window && (query.skip.is_some() || query.take.is_some()) {
            sql.push_str(" LIMIT ? OFFSET ?");
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
            .map_err(|e| Self::query_error("SELECT posts", format!("{e}")))?;

        let mut posts = Vec::with_capacity(rows.len());
        for row in &rows {
            posts.push(Self::row_to_post(row)?);
        }

        if !in_db_window {
            posts = distinct_by(posts, |post| {
                query
                    .distinct
                    .iter()
                    .map(|field| post.field_value(*field))
                    .collect()
            });
            posts = paginate(posts, query.skip, query.take);
        }

        Ok(posts)
    }

    /// Mutate all posts matching the filter; returns the number of
    /// affected records. Zero matches is not an error.
    pub async fn update_many_posts(
        &self,
        filter: &PostFilter,
        update: &PostUpdate,
    ) -> Result<u64, StoreError> {
        let Some(set) = update.render_set() else {
            return Ok(0);
        };

        let filter_sql = filter.render("posts");
        let sql = format!(
            "UPDATE posts SET {} WHERE id IN (SELECT posts.id FROM posts WHERE {})",
            set.clause, filter_sql.clause
        );
        let mut binds = set.binds;
        binds.extend(filter_sql.binds);

        let result = bind_values(sqlx::query(&sql), &binds)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::write_error("UPDATE posts", &e))?;

        Ok(result.rows_affected())
    }

    /// Remove exactly one post by id; returns the removed record.
    ///
    /// Fails with [`StoreError::NotFound`] if no post matches.
    pub async fn delete_post(&self, id: i64) -> Result<Post, StoreError> {
        let existing = self
            .find_unique_post(id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "Post",
                key: format!("id={id}"),
            })?;

        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::query_error("DELETE posts", format!("{e}")))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Post",
                key: format!("id={id}"),
            });
        }

        Ok(existing)
    }

    /// Remove all posts matching the filter; returns the number of removed
    /// records. The empty filter removes every post.
    pub async fn delete_many_posts(&self, filter: &PostFilter) -> Result<u64, StoreError> {
        let filter_sql = filter.render("posts");
        let sql = format!(
            "DELETE FROM posts WHERE id IN (SELECT posts.id FROM posts WHERE {})",
            filter_sql.clause
        );

        let result = bind_values(sqlx::query(&sql), &filter_sql.binds)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::query_error("DELETE posts", format!("{e}")))?;

        Ok(result.rows_affected())
    }

    fn post_order_clause(order_by: Option<(PostField, SortOrder)>) -> String {
        match order_by {
            Some((field, order)) if field != PostField::Id => {
                format!("{} {}, id ASC", field.column(), order.as_sql())
            }
            Some((_, order)) => format!("id {}", order.as_sql()),
            None => "id ASC".to_string(),
        }
    }

    /// Convert a database row to a `Post`.
    pub(crate) fn row_to_post(row: &SqliteRow) -> Result<Post, StoreError> {
        let created_at_str: String = row.get("created_at");
        let created_at = Self::parse_datetime(&created_at_str)?;

        Ok(Post {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            content: row.get("content"),
            published: row.get("published"),
            created_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::query::{IntFilter, StringFilter};
    use crate::store::core::tests::test_store;
    use crate::store::types::NewUser;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    async fn seed_author(store: &RecordStore) -> i64 {
        store
            .create_user(NewUser::new("author@x.com", "Author", 40))
            .await
            .expect("seed author")
            .id
    }

    #[tokio::test]
    #[serial]
    async fn test_create_post() {
        let store = test_store().await;
        let author = seed_author(&store).await;

        let post = store
            .create_post(
                NewPost::new(author, "Hello")
                    .with_content("First post")
                    .with_published(true),
            )
            .await
            .expect("create");

        assert_eq!(post.user_id, author);
        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, Some("First post".to_string()));
        assert!(post.published);
    }

    #[tokio::test]
    #[serial]
    async fn test_create_post_round_trips() {
        let store = test_store().await;
        let author = seed_author(&store).await;

        let created = store
            .create_post(NewPost::new(author, "Hello"))
            .await
            .expect("create");
        let fetched = store
            .find_unique_post(created.id)
            .await
            .expect("query")
            .expect("exists");
        assert_eq!(fetched.title, "Hello");
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    #[serial]
    async fn test_find_unique_post_not_found_is_none() {
        let store = test_store().await;
        let result = store.find_unique_post(99).await.expect("query");
        assert!(result.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_find_many_posts_filter_and_order() {
        let store = test_store().await;
        let author = seed_author(&store).await;
        for (title, published) in [("B side", false), ("A side", true), ("C side", true)] {
            store
                .create_post(NewPost::new(author, title).with_published(published))
                .await
                .expect("seed post");
        }

        let posts = store
            .find_many_posts(
                &PostQuery::default()
                    .filter(PostFilter::default().published(true))
                    .order_by(PostField::Title, SortOrder::Asc),
            )
            .await
            .expect("query");

        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A side", "C side"]);
    }

    #[tokio::test]
    #[serial]
    async fn test_find_many_posts_title_contains() {
        let store = test_store().await;
        let author = seed_author(&store).await;
        for title in ["intro to sqlite", "advanced sqlite", "cooking"] {
            store
                .create_post(NewPost::new(author, title))
                .await
                .expect("seed post");
        }

        let posts = store
            .find_many_posts(
                &PostQuery::default()
                    .filter(PostFilter::default().title(StringFilter::contains("sqlite"))),
            )
            .await
            .expect("query");
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    #[serial]
    async fn test_update_many_posts() {
        let store = test_store().await;
        let author = seed_author(&store).await;
        for title in ["a", "b"] {
            store
                .create_post(NewPost::new(author, title))
                .await
                .expect("seed post");
        }

        let count = store
            .update_many_posts(
                &PostFilter::default().user_id(IntFilter::Equals(author)),
                &PostUpdate::default().published(true),
            )
            .await
            .expect("update many");
        assert_eq!(count, 2);
    }

    #[tokio::test]
    #[serial]
    async fn test_update_many_posts_zero_matches_is_ok() {
        let store = test_store().await;
        let count = store
            .update_many_posts(
                &PostFilter::default().id(IntFilter::Equals(99)),
                &PostUpdate::default().published(true),
            )
            .await
            .expect("update many");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    #[serial]
    async fn test_delete_post() {
        let store = test_store().await;
        let author = seed_author(&store).await;
        let post = store
            .create_post(NewPost::new(author, "bye"))
            .await
            .expect("create");

        let deleted = store.delete_post(post.id).await.expect("delete");
        assert_eq!(deleted.id, post.id);

        let gone = store.find_unique_post(post.id).await.expect("query");
        assert!(gone.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_delete_post_not_found() {
        let store = test_store().await;
        let result = store.delete_post(99).await;
        assert!(matches!(
            result,
            Err(StoreError::NotFound { entity: "Post", .. })
        ));
    }

    #[tokio::test]
    #[serial]
    async fn test_delete_many_posts_empty_filter_removes_all() {
        let store = test_store().await;
        let author = seed_author(&store).await;
        for title in ["a", "b", "c"] {
            store
                .create_post(NewPost::new(author, title))
                .await
                .expect("seed post");
        }

        let count = store
            .delete_many_posts(&PostFilter::default())
            .await
            .expect("delete many");
        assert_eq!(count, 3);
    }

    #[tokio::test]
    #[serial]
    async fn test_cascade_delete_posts_with_owner() {
        let store = test_store().await;
        let author = seed_author(&store).await;
        store
            .create_post(NewPost::new(author, "orphan-to-be"))
            .await
            .expect("create");

        store
            .delete_user(&crate::store::UserKey::Id(author))
            .await
            .expect("delete user");

        let posts = store
            .find_many_posts(&PostQuery::default())
            .await
            .expect("query");
        assert!(posts.is_empty());
    }
}
