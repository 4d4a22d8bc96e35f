//! Feed ingestion.
//!
//! Turns a fetched [`RawFeed`] into deduplicated, persisted posts.

use tracing::debug;

use crate::datetime::normalize_date;
use crate::db::{DbPool, Feed, NewPost, PostRepository};
use crate::error::Result;
use crate::rss::types::RawFeed;

/// Ingestor persisting raw feed items as posts.
pub struct Ingestor<'a> {
    pool: &'a DbPool,
}

impl<'a> Ingestor<'a> {
    /// Create a new ingestor.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Ingest a fetched feed on behalf of the owning feed record.
    ///
    /// Items are processed in source order. Items whose URL is already
    /// stored are skipped, making re-ingestion idempotent. An
    /// unparseable publish date aborts the whole batch: items inserted
    /// before the failure point remain, the rest are not processed.
    /// A unique-URL race on insert counts as "already stored", never
    /// as a failure.
    ///
    /// Returns the number of newly inserted posts. Only the `posts`
    /// table is touched.
    pub async fn ingest(&self, raw: &RawFeed, feed: &Feed) -> Result<u64> {
        let posts = PostRepository::new(self.pool);
        let mut inserted = 0;

        for item in &raw.items {
            if posts.get_by_url(&item.link).await?.is_some() {
                debug!("post already stored, skipping: {}", item.link);
                continue;
            }

            let published_at = normalize_date(&item.pub_date)?;

            let new_post = NewPost::new(
                feed.id,
                &item.title,
                &item.description,
                &item.link,
                published_at,
            );
            match posts.create_or_ignore(&new_post).await? {
                Some(post) => {
                    debug!("stored post {} ({})", post.id, post.url);
                    inserted += 1;
                }
                None => {
                    debug!("post already stored, skipping: {}", item.link);
                }
            }
        }

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, FeedRepository, NewFeed, UserRepository};
    use crate::error::FeedloopError;
    use crate::rss::types::RawItem;

    async fn setup() -> (Database, Feed) {
        let db = Database::open_in_memory().await.unwrap();
        let user_id = UserRepository::new(db.pool())
            .create("alice")
            .await
            .unwrap()
            .id;
        let feed = FeedRepository::new(db.pool())
            .create(&NewFeed::new("Blog", "https://example.com/rss", user_id))
            .await
            .unwrap();
        (db, feed)
    }

    fn item(n: u32, pub_date: &str) -> RawItem {
        RawItem {
            title: format!("Article {}", n),
            link: format!("https://example.com/{}", n),
            description: format!("Description {}", n),
            pub_date: pub_date.to_string(),
        }
    }

    fn raw_feed(items: Vec<RawItem>) -> RawFeed {
        RawFeed {
            title: "Blog".to_string(),
            description: "A blog".to_string(),
            items,
        }
    }

    #[tokio::test]
    async fn test_ingest_inserts_posts() {
        let (db, feed) = setup().await;
        let raw = raw_feed(vec![item(1, "2025-02-02"), item(2, "2025-02-03")]);

        let inserted = Ingestor::new(db.pool()).ingest(&raw, &feed).await.unwrap();
        assert_eq!(inserted, 2);

        let posts = PostRepository::new(db.pool());
        assert_eq!(posts.count_by_feed(feed.id).await.unwrap(), 2);

        let post = posts
            .get_by_url("https://example.com/1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.title, "Article 1");
        assert_eq!(post.description, "Description 1");
        assert_eq!(post.feed_id, feed.id);
    }

    #[tokio::test]
    async fn test_ingest_twice_is_idempotent() {
        let (db, feed) = setup().await;
        let raw = raw_feed(vec![item(1, "2025-02-02"), item(2, "2025-02-03")]);
        let ingestor = Ingestor::new(db.pool());

        assert_eq!(ingestor.ingest(&raw, &feed).await.unwrap(), 2);
        assert_eq!(ingestor.ingest(&raw, &feed).await.unwrap(), 0);

        let posts = PostRepository::new(db.pool());
        assert_eq!(posts.count_by_feed(feed.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ingest_existing_url_no_error() {
        let (db, feed) = setup().await;
        let ingestor = Ingestor::new(db.pool());

        ingestor
            .ingest(&raw_feed(vec![item(1, "2025-02-02")]), &feed)
            .await
            .unwrap();

        // The same link fetched again inserts nothing and reports no
        // error, even with a different title.
        let mut dup = item(1, "2025-02-02");
        dup.title = "Renamed".to_string();
        let inserted = ingestor.ingest(&raw_feed(vec![dup]), &feed).await.unwrap();
        assert_eq!(inserted, 0);
    }

    #[tokio::test]
    async fn test_bad_date_aborts_batch() {
        let (db, feed) = setup().await;
        let raw = raw_feed(vec![
            item(1, "2025-02-02"),
            item(2, "not a date"),
            item(3, "2025-02-04"),
        ]);

        let err = Ingestor::new(db.pool())
            .ingest(&raw, &feed)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedloopError::UnparseableDate(_)));

        // Item 1 landed before the failure; item 3 was never reached.
        let posts = PostRepository::new(db.pool());
        assert!(posts
            .get_by_url("https://example.com/1")
            .await
            .unwrap()
            .is_some());
        assert!(posts
            .get_by_url("https://example.com/3")
            .await
            .unwrap()
            .is_none());
        assert_eq!(posts.count_by_feed(feed.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ingest_empty_feed() {
        let (db, feed) = setup().await;
        let inserted = Ingestor::new(db.pool())
            .ingest(&raw_feed(vec![]), &feed)
            .await
            .unwrap();
        assert_eq!(inserted, 0);
    }
}
