//! Post entity and repository.
//!
//! Posts are created exclusively by the ingestion pipeline. The post
//! URL is unique and acts as the deduplication key: a given article is
//! stored at most once no matter how often its feed is fetched.

use chrono::{DateTime, Utc};

use super::{parse_datetime, DbPool};
use crate::error::{FeedloopError, Result};

/// A stored feed item.
#[derive(Debug, Clone)]
pub struct Post {
    /// Post ID.
    pub id: i64,
    /// Feed the post came from.
    pub feed_id: i64,
    /// Item title.
    pub title: String,
    /// Item description.
    pub description: String,
    /// Canonical article URL, unique across all posts.
    pub url: String,
    /// Normalized publish date.
    pub published_at: DateTime<Utc>,
    /// When the post was stored.
    pub created_at: DateTime<Utc>,
    /// When the post was last updated.
    pub updated_at: DateTime<Utc>,
}

/// New post for creation.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Feed the post came from.
    pub feed_id: i64,
    /// Item title.
    pub title: String,
    /// Item description.
    pub description: String,
    /// Canonical article URL.
    pub url: String,
    /// Normalized publish date.
    pub published_at: DateTime<Utc>,
}

impl NewPost {
    /// Create a new post.
    pub fn new(
        feed_id: i64,
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            feed_id,
            title: title.into(),
            description: description.into(),
            url: url.into(),
            published_at,
        }
    }
}

/// Row type for posts from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: i64,
    feed_id: i64,
    title: String,
    description: String,
    url: String,
    published_at: String,
    created_at: String,
    updated_at: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            feed_id: row.feed_id,
            title: row.title,
            description: row.description,
            url: row.url,
            published_at: parse_datetime(&row.published_at).unwrap_or_else(Utc::now),
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for post operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a post, ignoring it if a post with the same URL exists.
    ///
    /// Returns `None` when the URL was already stored. This is the
    /// "duplicate is not an error" contract the ingestor relies on.
    pub async fn create_or_ignore(&self, post: &NewPost) -> Result<Option<Post>> {
        let now = Utc::now().to_rfc3339();
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (feed_id, title, description, url, published_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(url) DO NOTHING
            RETURNING id, feed_id, title, description, url, published_at, created_at, updated_at
            "#,
        )
        .bind(post.feed_id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.url)
        .bind(post.published_at.to_rfc3339())
        .bind(&now)
        .bind(&now)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(row.map(Post::from))
    }

    /// Get a post by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, feed_id, title, description, url, published_at, created_at, updated_at
            FROM posts
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(row.map(Post::from))
    }

    /// List posts from the feeds a user follows, newest published
    /// first.
    pub async fn list_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id, p.feed_id, p.title, p.description, p.url, p.published_at,
                   p.created_at, p.updated_at
            FROM posts p
            JOIN feed_follows ff ON ff.feed_id = p.feed_id
            WHERE ff.user_id = $1
            ORDER BY p.published_at DESC, p.id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    /// Count posts for a feed.
    pub async fn count_by_feed(&self, feed_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE feed_id = $1")
            .bind(feed_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(count.0)
    }
}
