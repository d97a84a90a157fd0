//! Scan bounds
//!
//! `[start, stop)` ranges over encoded row keys.

use crate::error::Result;
use super::codec::{validate_id, SEPARATOR};

/// A half-open row key range: `start` inclusive, `stop` exclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub start: String,
    pub stop: String,
}

impl KeyRange {
    pub fn new(start: impl Into<String>, stop: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            stop: stop.into(),
        }
    }

    /// Every key of the form `{segments joined by !}!...`
    fn under(segments: &[&str]) -> Result<Self> {
        let mut prefix = String::new();
        for segment in segments {
            validate_id(segment)?;
            prefix.push_str(segment);
            prefix.push(SEPARATOR);
        }
        let mut stop = prefix.clone();
        stop.pop();
        // the byte right after the separator
        stop.push(char::from(SEPARATOR as u8 + 1));
        Ok(Self::new(prefix, stop))
    }

    /// All stats or connection rows of one crawl
    pub fn crawl(crawl_key: &str) -> Result<Self> {
        Self::under(&[crawl_key])
    }

    /// Outbound connection rows of `from` within one crawl
    pub fn outbound(crawl_key: &str, from: &str) -> Result<Self> {
        Self::under(&[crawl_key, from])
    }

    /// History rows of one pubkey across all crawls
    pub fn node_history(pubkey: &str) -> Result<Self> {
        Self::under(&[pubkey])
    }

    /// Every raw crawl key (all-digit, fixed width)
    pub fn time_ranges() -> Self {
        Self::new("0", ":")
    }

    /// Every key whose bytes are legal id bytes
    pub fn full() -> Self {
        Self::new("\"", "\u{7f}")
    }

    pub fn contains(&self, key: &str) -> bool {
        key >= self.start.as_str() && key < self.stop.as_str()
    }
}
