//! feedloop - Multi-user RSS feed aggregator
//!
//! Users register feeds, follow feeds owned by others, and a
//! background aggregation loop periodically fetches feed XML,
//! extracts new posts and persists them for browsing.

pub mod app;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod rss;

pub use app::App;
pub use config::Config;
pub use datetime::normalize_date;
pub use db::{
    Database, DbPool, Feed, FeedFollow, FeedFollowRepository, FeedRepository, NewFeed, NewPost,
    Post, PostRepository, User, UserRepository,
};
pub use error::{FeedloopError, Result};
pub use rss::{Aggregator, FeedFetcher, Ingestor, RawFeed, RawItem};
