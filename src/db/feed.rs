//! Feed entity and repository.

use chrono::{DateTime, Utc};

use super::{parse_datetime, DbPool};
use crate::error::{FeedloopError, Result};

/// A registered feed.
#[derive(Debug, Clone)]
pub struct Feed {
    /// Feed ID.
    pub id: i64,
    /// Display name chosen at registration.
    pub name: String,
    /// Feed URL, unique across all feeds.
    pub url: String,
    /// User who registered the feed.
    pub user_id: i64,
    /// Last time the aggregation loop fetched this feed.
    /// Set only by the scheduler path, never by user commands.
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// When the feed was registered.
    pub created_at: DateTime<Utc>,
    /// When the feed was last updated.
    pub updated_at: DateTime<Utc>,
}

/// New feed for creation.
#[derive(Debug, Clone)]
pub struct NewFeed {
    /// Display name.
    pub name: String,
    /// Feed URL.
    pub url: String,
    /// Owning user.
    pub user_id: i64,
}

impl NewFeed {
    /// Create a new feed.
    pub fn new(name: impl Into<String>, url: impl Into<String>, user_id: i64) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            user_id,
        }
    }
}

/// A feed together with its owner's name, for listings.
#[derive(Debug, Clone)]
pub struct FeedWithOwner {
    /// The feed.
    pub feed: Feed,
    /// Name of the owning user.
    pub owner_name: String,
}

/// Row type for feeds from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedRow {
    id: i64,
    name: String,
    url: String,
    user_id: i64,
    last_fetched_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<FeedRow> for Feed {
    fn from(row: FeedRow) -> Self {
        Feed {
            id: row.id,
            name: row.name,
            url: row.url,
            user_id: row.user_id,
            last_fetched_at: row.last_fetched_at.and_then(|s| parse_datetime(&s)),
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Row type for feeds joined with owner names.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedWithOwnerRow {
    id: i64,
    name: String,
    url: String,
    user_id: i64,
    last_fetched_at: Option<String>,
    created_at: String,
    updated_at: String,
    owner_name: String,
}

impl From<FeedWithOwnerRow> for FeedWithOwner {
    fn from(row: FeedWithOwnerRow) -> Self {
        let feed = Feed {
            id: row.id,
            name: row.name,
            url: row.url,
            user_id: row.user_id,
            last_fetched_at: row.last_fetched_at.and_then(|s| parse_datetime(&s)),
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        };
        FeedWithOwner {
            feed,
            owner_name: row.owner_name,
        }
    }
}

/// Repository for feed operations.
pub struct FeedRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new feed. URLs are unique across all feeds.
    pub async fn create(&self, feed: &NewFeed) -> Result<Feed> {
        let now = Utc::now().to_rfc3339();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO feeds (name, url, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&feed.name)
        .bind(&feed.url)
        .bind(feed.user_id)
        .bind(&now)
        .bind(&now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FeedloopError::NotFound("feed".into()))
    }

    /// Get a feed by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
            FROM feeds
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(row.map(Feed::from))
    }

    /// Get a feed by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
            FROM feeds
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(row.map(Feed::from))
    }

    /// List all feeds with their owners, in registration order.
    pub async fn list_all(&self) -> Result<Vec<FeedWithOwner>> {
        let rows = sqlx::query_as::<_, FeedWithOwnerRow>(
            r#"
            SELECT f.id, f.name, f.url, f.user_id, f.last_fetched_at,
                   f.created_at, f.updated_at, u.name AS owner_name
            FROM feeds f
            JOIN users u ON u.id = f.user_id
            ORDER BY f.id ASC
            "#,
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(FeedWithOwner::from).collect())
    }

    /// Get the least recently fetched feed. Never-fetched feeds
    /// (NULL `last_fetched_at`) sort first.
    pub async fn get_next_to_fetch(&self) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
            FROM feeds
            ORDER BY last_fetched_at ASC NULLS FIRST, id ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(row.map(Feed::from))
    }

    /// Record that a feed was fetched at `fetched_at`.
    pub async fn mark_fetched(&self, id: i64, fetched_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE feeds SET last_fetched_at = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(fetched_at.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
