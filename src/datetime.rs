//! Publish-date normalization for feed items.
//!
//! Feed publishers disagree wildly about date formats, so the
//! normalizer tries a fixed, ordered list of known layouts and takes
//! the first that parses the full string. The order is part of the
//! contract: `DD/MM/YYYY` sits after the ISO layouts so an ambiguous
//! string is always read the same way between runs.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{FeedloopError, Result};

/// A single date layout the normalizer knows how to try.
#[derive(Debug, Clone, Copy)]
enum Layout {
    /// RFC 2822 grammar: covers RFC 1123 and RFC 822, with named or
    /// numeric zones and with or without seconds.
    Rfc2822,
    /// RFC 3339, with and without fractional seconds.
    Rfc3339,
    /// A zoneless datetime pattern, interpreted as UTC.
    NaiveDateTime(&'static str),
    /// A date-only pattern, normalized to midnight UTC.
    NaiveDate(&'static str),
}

/// Known layouts in priority order.
const LAYOUTS: &[Layout] = &[
    Layout::Rfc2822,
    Layout::Rfc3339,
    // RFC 850, e.g. "Monday, 02-Jan-06 15:04:05 GMT"
    Layout::NaiveDateTime("%A, %d-%b-%y %H:%M:%S %Z"),
    // e.g. "2025-02-02 14:30:00"
    Layout::NaiveDateTime("%Y-%m-%d %H:%M:%S"),
    // e.g. "2025-02-02T14:30:00Z"
    Layout::NaiveDateTime("%Y-%m-%dT%H:%M:%SZ"),
    // e.g. "02 Feb 2025"
    Layout::NaiveDate("%d %b %Y"),
    // e.g. "2025-02-02"
    Layout::NaiveDate("%Y-%m-%d"),
    // e.g. "02/02/2025" (day first)
    Layout::NaiveDate("%d/%m/%Y"),
];

/// Parse an arbitrary publish-date string from feed XML.
///
/// Returns the instant for the first matching layout, or
/// [`FeedloopError::UnparseableDate`] when none match. Layouts without
/// zone information are taken as UTC; date-only layouts normalize to
/// midnight UTC.
pub fn normalize_date(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();

    for layout in LAYOUTS {
        if let Some(dt) = try_layout(*layout, trimmed) {
            return Ok(dt);
        }
    }

    Err(FeedloopError::UnparseableDate(raw.to_string()))
}

fn try_layout(layout: Layout, s: &str) -> Option<DateTime<Utc>> {
    match layout {
        Layout::Rfc2822 => DateTime::parse_from_rfc2822(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Layout::Rfc3339 => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Layout::NaiveDateTime(fmt) => NaiveDateTime::parse_from_str(s, fmt)
            .ok()
            .map(|naive| naive.and_utc()),
        Layout::NaiveDate(fmt) => NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc()),
    }
}
