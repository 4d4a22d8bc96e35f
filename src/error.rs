//! Error types for feedloop.

use thiserror::Error;

/// Common error type for feedloop.
#[derive(Error, Debug)]
pub enum FeedloopError {
    /// Database error.
    ///
    /// This is a generic database error that wraps errors from sqlx.
    #[error("database error: {0}")]
    Database(String),

    /// Network or HTTP failure while fetching a feed.
    #[error("network error: {0}")]
    Network(String),

    /// The fetched body could not be parsed as a feed document.
    #[error("malformed feed: {0}")]
    MalformedFeed(String),

    /// No known date layout matched the item's publish date.
    #[error("unparseable date: {0}")]
    UnparseableDate(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid command usage.
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for FeedloopError {
    fn from(e: sqlx::Error) -> Self {
        FeedloopError::Database(e.to_string())
    }
}

/// Result type alias for feedloop operations.
pub type Result<T> = std::result::Result<T, FeedloopError>;
