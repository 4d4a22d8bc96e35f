//! In-memory representation of a fetched feed document.

/// A parsed feed document prior to persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFeed {
    /// Channel title.
    pub title: String,
    /// Channel description.
    pub description: String,
    /// Items in the order the document listed them.
    pub items: Vec<RawItem>,
}

/// A single item of a fetched feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    /// Item title.
    pub title: String,
    /// Canonical article URL.
    pub link: String,
    /// Item description.
    pub description: String,
    /// Publish date exactly as the document carried it. Normalized
    /// later by the ingestor.
    pub pub_date: String,
}
