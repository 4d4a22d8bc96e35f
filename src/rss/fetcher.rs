//! RSS feed fetcher.
//!
//! Downloads a feed URL with a bounded timeout and an identifying
//! user-agent, parses the body as an RSS channel and unescapes
//! HTML entities in the text fields.

use std::time::Duration;

use reqwest::Client;
use rss::Channel;

use crate::error::{FeedloopError, Result};
use crate::rss::types::{RawFeed, RawItem};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total request timeout in seconds. Bounds how long a single tick
/// can stay stuck on a slow feed.
const TOTAL_TIMEOUT_SECS: u64 = 30;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User agent string for feed fetching.
const USER_AGENT: &str = "feedloop/0.1 (RSS aggregator)";

/// Feed fetcher wrapping a configured HTTP client.
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    /// Create a new fetcher with default settings.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedloopError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch and parse the feed at `url`.
    ///
    /// Transport failures and non-success statuses map to
    /// [`FeedloopError::Network`], parse failures to
    /// [`FeedloopError::MalformedFeed`]. No retries; no persisted
    /// state is touched.
    pub async fn fetch(&self, url: &str) -> Result<RawFeed> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedloopError::Network(format!("failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(FeedloopError::Network(format!(
                "HTTP error fetching {}: {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedloopError::Network(format!("failed to read response: {}", e)))?;

        parse_feed(&bytes)
    }
}

/// Parse feed bytes into a [`RawFeed`].
pub fn parse_feed(bytes: &[u8]) -> Result<RawFeed> {
    let channel = Channel::read_from(bytes)
        .map_err(|e| FeedloopError::MalformedFeed(e.to_string()))?;

    let items: Vec<RawItem> = channel
        .items()
        .iter()
        .map(|item| RawItem {
            title: unescape(item.title().unwrap_or_default()),
            link: item.link().unwrap_or_default().to_string(),
            description: unescape(item.description().unwrap_or_default()),
            pub_date: item.pub_date().unwrap_or_default().to_string(),
        })
        .collect();

    Ok(RawFeed {
        title: unescape(channel.title()),
        description: unescape(channel.description()),
        items,
    })
}

/// Maximum entity name length worth scanning for.
const MAX_ENTITY_LEN: usize = 10;

/// Decode HTML entities in text.
///
/// Feed text is frequently double-escaped (`&amp;lt;` and friends), so
/// the XML parser's own decoding still leaves entities behind.
/// Unknown entities are kept as-is.
pub fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        while let Some(&c) = chars.peek() {
            if c == ';' {
                chars.next();
                terminated = true;
                break;
            }
            if c == '&' || c.is_whitespace() || entity.len() >= MAX_ENTITY_LEN {
                break;
            }
            entity.push(c);
            chars.next();
        }

        if !terminated {
            result.push('&');
            result.push_str(&entity);
            continue;
        }

        match entity.as_str() {
            "amp" => result.push('&'),
            "lt" => result.push('<'),
            "gt" => result.push('>'),
            "quot" => result.push('"'),
            "apos" => result.push('\''),
            "nbsp" => result.push(' '),
            _ => match parse_numeric_entity(&entity) {
                Some(code) => {
                    if let Some(c) = char::from_u32(code) {
                        result.push(c);
                    }
                }
                None => {
                    result.push('&');
                    result.push_str(&entity);
                    result.push(';');
                }
            },
        }
    }

    result
}

/// Parse a numeric HTML entity (e.g., "#123" or "#x7B").
fn parse_numeric_entity(entity: &str) -> Option<u32> {
    let digits = entity.strip_prefix('#')?;
    if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        digits.parse().ok()
    }
}
