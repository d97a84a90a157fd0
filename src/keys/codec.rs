//! Key encoding and decoding
//!
//! Pure functions, no store access.

use chrono::{DateTime, TimeZone, Utc};
use crate::error::{CrawlError, Result};

/// Separator between id segments; sorts below every legal id byte
pub const SEPARATOR: char = '!';

/// Separator between the two epoch fields of a raw crawl key
pub const TIME_RANGE_SEPARATOR: char = '_';

/// Digits per epoch field: the width of `u64::MAX`
pub const TIME_WIDTH: usize = 20;

/// Lowest and highest byte allowed inside an id
const ID_MIN: u8 = 0x22;
const ID_MAX: u8 = 0x7E;

// =============================================================================
// Ids
// =============================================================================

/// Check that an id can be embedded in a composite key without breaking order
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(CrawlError::KeyFormat("empty id".to_string()));
    }
    if let Some(bad) = id.bytes().find(|b| !(ID_MIN..=ID_MAX).contains(b)) {
        return Err(CrawlError::KeyFormat(format!(
            "id {:?} contains byte 0x{:02x} outside 0x{:02x}..=0x{:02x}",
            id, bad, ID_MIN, ID_MAX
        )));
    }
    Ok(())
}

fn join(segments: &[&str]) -> Result<String> {
    let mut key = String::with_capacity(segments.iter().map(|s| s.len() + 1).sum());
    for (i, segment) in segments.iter().enumerate() {
        validate_id(segment)?;
        if i > 0 {
            key.push(SEPARATOR);
        }
        key.push_str(segment);
    }
    Ok(key)
}

fn split<const N: usize>(key: &str) -> Result<[String; N]> {
    let parts: Vec<&str> = key.split(SEPARATOR).collect();
    if parts.len() != N {
        return Err(CrawlError::KeyFormat(format!(
            "key {:?} has {} segments, expected {}",
            key,
            parts.len(),
            N
        )));
    }
    for part in &parts {
        validate_id(part)?;
    }
    let owned: Vec<String> = parts.into_iter().map(str::to_string).collect();
    owned
        .try_into()
        .map_err(|_| CrawlError::KeyFormat(format!("key {:?}", key)))
}

// =============================================================================
// Raw crawl keys
// =============================================================================

fn epoch_field(ts: &DateTime<Utc>) -> Result<String> {
    let millis = ts.timestamp_millis();
    if millis < 0 {
        return Err(CrawlError::KeyFormat(format!(
            "timestamp {} predates the epoch",
            ts
        )));
    }
    Ok(format!("{:0width$}", millis, width = TIME_WIDTH))
}

fn parse_epoch_field(key: &str, field: &str) -> Result<DateTime<Utc>> {
    if field.len() != TIME_WIDTH || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CrawlError::KeyFormat(format!(
            "key {:?}: epoch field {:?} is not {} digits",
            key, field, TIME_WIDTH
        )));
    }
    let millis: i64 = field
        .parse()
        .map_err(|_| CrawlError::KeyFormat(format!("key {:?}: epoch out of range", key)))?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| CrawlError::KeyFormat(format!("key {:?}: epoch out of range", key)))
}

/// `{start_ms:020}_{end_ms:020}`
pub fn encode_time_range_key(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Result<String> {
    Ok(format!(
        "{}{}{}",
        epoch_field(start)?,
        TIME_RANGE_SEPARATOR,
        epoch_field(end)?
    ))
}

pub fn decode_time_range_key(key: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = key.split_once(TIME_RANGE_SEPARATOR).ok_or_else(|| {
        CrawlError::KeyFormat(format!("key {:?} has no time range separator", key))
    })?;
    Ok((parse_epoch_field(key, start)?, parse_epoch_field(key, end)?))
}

// =============================================================================
// Crawl-scoped keys
// =============================================================================

/// Node history key; pubkey-major so one node's history is a single prefix
pub fn encode_node_key(crawl_key: &str, pubkey: &str) -> Result<String> {
    join(&[pubkey, crawl_key])
}

/// Returns `(crawl_key, pubkey)`
pub fn decode_node_key(key: &str) -> Result<(String, String)> {
    let [pubkey, crawl_key] = split::<2>(key)?;
    Ok((crawl_key, pubkey))
}

pub fn encode_stats_key(crawl_key: &str, pubkey: &str) -> Result<String> {
    join(&[crawl_key, pubkey])
}

/// Returns `(crawl_key, pubkey)`
pub fn decode_stats_key(key: &str) -> Result<(String, String)> {
    let [crawl_key, pubkey] = split::<2>(key)?;
    Ok((crawl_key, pubkey))
}

pub fn encode_connection_key(crawl_key: &str, from: &str, to: &str) -> Result<String> {
    join(&[crawl_key, from, to])
}

/// Returns `(crawl_key, from, to)`
pub fn decode_connection_key(key: &str) -> Result<(String, String, String)> {
    let [crawl_key, from, to] = split::<3>(key)?;
    Ok((crawl_key, from, to))
}

/// Split a processed crawl's `"from,to"` connection entry
pub fn parse_connection_pair(pair: &str) -> Result<(&str, &str)> {
    let (from, to) = pair
        .split_once(',')
        .ok_or_else(|| CrawlError::KeyFormat(format!("connection {:?} has no ','", pair)))?;
    if to.contains(',') {
        return Err(CrawlError::KeyFormat(format!(
            "connection {:?} has more than two ends",
            pair
        )));
    }
    validate_id(from)?;
    validate_id(to)?;
    Ok((from, to))
}
