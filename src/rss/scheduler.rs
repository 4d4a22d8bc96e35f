//! Background aggregation loop.
//!
//! One feed per tick, least recently fetched first. A feed is marked
//! fetched before the network request goes out, so a slow or failing
//! feed does not get retried until its next natural round-robin turn.
//! No error from processing one feed ever terminates the loop; only
//! cancelling the future (dropping it, e.g. through `tokio::select!`
//! against a shutdown signal) does.

use std::convert::Infallible;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::db::{DbPool, FeedRepository};
use crate::error::Result;
use crate::rss::fetcher::FeedFetcher;
use crate::rss::ingest::Ingestor;

/// Aggregation loop driver.
pub struct Aggregator {
    pool: DbPool,
    fetcher: FeedFetcher,
    interval: Duration,
}

impl Aggregator {
    /// Create a new aggregator polling at the given interval.
    pub fn new(pool: DbPool, poll_interval: Duration) -> Result<Self> {
        Ok(Self {
            pool,
            fetcher: FeedFetcher::new()?,
            interval: poll_interval,
        })
    }

    /// Run the aggregation loop.
    ///
    /// The success type is uninhabited: ticks are strictly sequential,
    /// every tick error is logged and swallowed, and only cancelling
    /// the future stops the loop.
    pub async fn run(&self) -> Result<Infallible> {
        info!(
            "aggregation loop started (interval: {:?})",
            self.interval
        );

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            if let Err(e) = self.scrape_once().await {
                warn!("tick failed: {}", e);
            }
        }
    }

    /// Process a single tick: select the next feed, mark it fetched,
    /// download and ingest it.
    ///
    /// Public so a one-shot scrape can propagate its error to the
    /// caller. Returns the number of newly inserted posts; a tick with
    /// no registered feeds is a no-op.
    pub async fn scrape_once(&self) -> Result<u64> {
        let feeds = FeedRepository::new(&self.pool);

        let feed = match feeds.get_next_to_fetch().await? {
            Some(feed) => feed,
            None => {
                debug!("no feeds registered, nothing to do");
                return Ok(0);
            }
        };

        // Mark before fetching so the next tick moves on even if this
        // fetch hangs or fails.
        feeds.mark_fetched(feed.id, Utc::now()).await?;

        debug!("fetching feed {} ({})", feed.id, feed.url);
        let raw = self.fetcher.fetch(&feed.url).await?;

        let inserted = Ingestor::new(&self.pool).ingest(&raw, &feed).await?;
        if inserted > 0 {
            info!("feed {} ({}): {} new post(s)", feed.id, feed.name, inserted);
        } else {
            debug!("feed {} ({}): no new posts", feed.id, feed.name);
        }

        Ok(inserted)
    }
}
