//! Feed polling and ingestion pipeline.
//!
//! The [`scheduler::Aggregator`] drives the loop: each tick it picks
//! the least recently fetched feed, marks it fetched, downloads and
//! parses it with [`fetcher::FeedFetcher`], and hands the result to
//! [`ingest::Ingestor`] which deduplicates and persists posts.

pub mod fetcher;
pub mod ingest;
pub mod scheduler;
pub mod types;

pub use fetcher::FeedFetcher;
pub use ingest::Ingestor;
pub use scheduler::Aggregator;
pub use types::{RawFeed, RawItem};
