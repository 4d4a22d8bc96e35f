//! Feed follow entity and repository.
//!
//! A follow is the many-to-many link letting any user see posts from
//! any feed, independent of ownership. At most one follow exists per
//! (user, feed) pair.

use chrono::{DateTime, Utc};

use super::{parse_datetime, DbPool};
use crate::error::{FeedloopError, Result};

/// A "user follows feed" relationship.
#[derive(Debug, Clone)]
pub struct FeedFollow {
    /// Follow ID.
    pub id: i64,
    /// Following user.
    pub user_id: i64,
    /// Followed feed.
    pub feed_id: i64,
    /// When the follow was created.
    pub created_at: DateTime<Utc>,
    /// When the follow was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A followed feed with display names, for listings and confirmation
/// messages.
#[derive(Debug, Clone)]
pub struct FollowedFeed {
    /// The follow relationship.
    pub follow: FeedFollow,
    /// Name of the followed feed.
    pub feed_name: String,
    /// Name of the following user.
    pub user_name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedFollowRow {
    id: i64,
    user_id: i64,
    feed_id: i64,
    created_at: String,
    updated_at: String,
}

impl From<FeedFollowRow> for FeedFollow {
    fn from(row: FeedFollowRow) -> Self {
        FeedFollow {
            id: row.id,
            user_id: row.user_id,
            feed_id: row.feed_id,
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct FollowedFeedRow {
    id: i64,
    user_id: i64,
    feed_id: i64,
    created_at: String,
    updated_at: String,
    feed_name: String,
    user_name: String,
}

impl From<FollowedFeedRow> for FollowedFeed {
    fn from(row: FollowedFeedRow) -> Self {
        let follow = FeedFollow {
            id: row.id,
            user_id: row.user_id,
            feed_id: row.feed_id,
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        };
        FollowedFeed {
            follow,
            feed_name: row.feed_name,
            user_name: row.user_name,
        }
    }
}

/// Repository for feed follow operations.
pub struct FeedFollowRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedFollowRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a follow for the (user, feed) pair.
    ///
    /// Fails if the pair already exists or references a missing user
    /// or feed.
    pub async fn create(&self, user_id: i64, feed_id: i64) -> Result<FollowedFeed> {
        let now = Utc::now().to_rfc3339();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO feed_follows (user_id, feed_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(feed_id)
        .bind(&now)
        .bind(&now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        let row = sqlx::query_as::<_, FollowedFeedRow>(
            r#"
            SELECT ff.id, ff.user_id, ff.feed_id, ff.created_at, ff.updated_at,
                   f.name AS feed_name, u.name AS user_name
            FROM feed_follows ff
            JOIN feeds f ON f.id = ff.feed_id
            JOIN users u ON u.id = ff.user_id
            WHERE ff.id = $1
            "#,
        )
        .bind(id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(FollowedFeed::from(row))
    }

    /// Delete the follow for the (user, feed) pair.
    pub async fn delete(&self, user_id: i64, feed_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM feed_follows WHERE user_id = $1 AND feed_id = $2")
            .bind(user_id)
            .bind(feed_id)
            .execute(self.pool)
            .await
            .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// List the feeds a user follows, in follow order.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<FollowedFeed>> {
        let rows = sqlx::query_as::<_, FollowedFeedRow>(
            r#"
            SELECT ff.id, ff.user_id, ff.feed_id, ff.created_at, ff.updated_at,
                   f.name AS feed_name, u.name AS user_name
            FROM feed_follows ff
            JOIN feeds f ON f.id = ff.feed_id
            JOIN users u ON u.id = ff.user_id
            WHERE ff.user_id = $1
            ORDER BY ff.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(FollowedFeed::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, FeedRepository, NewFeed, UserRepository};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user_id = UserRepository::new(db.pool())
            .create("alice")
            .await
            .unwrap()
            .id;
        let feed_id = FeedRepository::new(db.pool())
            .create(&NewFeed::new("Blog", "https://example.com/rss", user_id))
            .await
            .unwrap()
            .id;
        (db, user_id, feed_id)
    }

    #[tokio::test]
    async fn test_create_follow() {
        let (db, user_id, feed_id) = setup().await;
        let repo = FeedFollowRepository::new(db.pool());

        let followed = repo.create(user_id, feed_id).await.unwrap();
        assert_eq!(followed.follow.user_id, user_id);
        assert_eq!(followed.follow.feed_id, feed_id);
        assert_eq!(followed.feed_name, "Blog");
        assert_eq!(followed.user_name, "alice");
    }

    #[tokio::test]
    async fn test_duplicate_follow_rejected() {
        let (db, user_id, feed_id) = setup().await;
        let repo = FeedFollowRepository::new(db.pool());

        repo.create(user_id, feed_id).await.unwrap();
        assert!(repo.create(user_id, feed_id).await.is_err());
    }

    #[tokio::test]
    async fn test_follow_missing_feed_rejected() {
        let (db, user_id, _) = setup().await;
        let repo = FeedFollowRepository::new(db.pool());
        assert!(repo.create(user_id, 999).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_follow() {
        let (db, user_id, feed_id) = setup().await;
        let repo = FeedFollowRepository::new(db.pool());

        repo.create(user_id, feed_id).await.unwrap();
        assert!(repo.delete(user_id, feed_id).await.unwrap());
        assert!(repo.list_for_user(user_id).await.unwrap().is_empty());

        // Deleting again is a no-op.
        assert!(!repo.delete(user_id, feed_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_for_user() {
        let (db, user_id, feed_id) = setup().await;
        let feed2 = FeedRepository::new(db.pool())
            .create(&NewFeed::new("Other", "https://other.com/rss", user_id))
            .await
            .unwrap();
        let repo = FeedFollowRepository::new(db.pool());

        repo.create(user_id, feed_id).await.unwrap();
        repo.create(user_id, feed2.id).await.unwrap();

        let follows = repo.list_for_user(user_id).await.unwrap();
        assert_eq!(follows.len(), 2);
        assert_eq!(follows[0].feed_name, "Blog");
        assert_eq!(follows[1].feed_name, "Other");
    }
}
