//! Tests for the key codec
//!
//! These tests verify:
//! - Fixed-width raw crawl keys and their chronological order
//! - Composite key layout for node, stats and connection rows
//! - Id alphabet validation
//! - Rejection of malformed keys and connection pairs

use chrono::{DateTime, TimeZone, Utc};
use crawlstore::keys::{
    decode_connection_key, decode_node_key, decode_stats_key, decode_time_range_key,
    encode_connection_key, encode_node_key, encode_stats_key, encode_time_range_key,
    parse_connection_pair, validate_id, TIME_WIDTH,
};
use crawlstore::CrawlError;

// =============================================================================
// Helper Functions
// =============================================================================

fn ts(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap()
}

// =============================================================================
// Raw Crawl Keys
// =============================================================================

#[test]
fn test_time_range_key_is_fixed_width() {
    let key = encode_time_range_key(&ts(1), &ts(1_433_116_800_000)).unwrap();
    assert_eq!(key, "00000000000000000001_00000001433116800000");
    assert_eq!(key.len(), TIME_WIDTH * 2 + 1);
}

#[test]
fn test_time_range_keys_sort_chronologically() {
    let instants = [0_i64, 9, 10, 999, 1_000, 1_433_116_800_000, 4_102_444_800_000];
    let keys: Vec<String> = instants
        .iter()
        .map(|ms| encode_time_range_key(&ts(*ms), &ts(*ms)).unwrap())
        .collect();

    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_time_range_key_orders_across_digit_boundaries() {
    let end = ts(10_000);
    let a = encode_time_range_key(&ts(9_999), &end).unwrap();
    let b = encode_time_range_key(&ts(10_000), &end).unwrap();
    assert!(a < b);
}

#[test]
fn test_equal_start_orders_by_end() {
    let short = encode_time_range_key(&ts(5_000), &ts(6_000)).unwrap();
    let long = encode_time_range_key(&ts(5_000), &ts(60_000)).unwrap();
    assert!(short < long);
}

#[test]
fn test_time_range_key_decodes_to_same_instants() {
    let start = ts(1_433_116_800_123);
    let end = ts(1_433_116_900_456);
    let key = encode_time_range_key(&start, &end).unwrap();
    assert_eq!(decode_time_range_key(&key).unwrap(), (start, end));
}

#[test]
fn test_time_range_key_rejects_pre_epoch() {
    assert!(encode_time_range_key(&ts(-1), &ts(0)).is_err());
}

#[test]
fn test_decode_time_range_key_rejects_garbage() {
    assert!(decode_time_range_key("1_2").is_err());
    assert!(decode_time_range_key("no-separator").is_err());
    assert!(decode_time_range_key("0000000000000000000a_00000000000000000001").is_err());
}

// =============================================================================
// Composite Keys
// =============================================================================

#[test]
fn test_node_key_is_pubkey_major() {
    assert_eq!(encode_node_key("c1", "n9abc").unwrap(), "n9abc!c1");
    assert_eq!(
        decode_node_key("n9abc!c1").unwrap(),
        ("c1".to_string(), "n9abc".to_string())
    );
}

#[test]
fn test_stats_key_is_crawl_major() {
    assert_eq!(encode_stats_key("c1", "n9abc").unwrap(), "c1!n9abc");
    assert_eq!(
        decode_stats_key("c1!n9abc").unwrap(),
        ("c1".to_string(), "n9abc".to_string())
    );
}

#[test]
fn test_connection_key_round_trip() {
    let key = encode_connection_key("2015-06-01T00:00:00Z", "n9A", "n9B").unwrap();
    assert_eq!(
        decode_connection_key(&key).unwrap(),
        (
            "2015-06-01T00:00:00Z".to_string(),
            "n9A".to_string(),
            "n9B".to_string()
        )
    );
}

#[test]
fn test_shorter_id_sorts_before_its_extension() {
    let short = encode_node_key("zz", "ab").unwrap();
    let long = encode_node_key("00", "abc").unwrap();
    assert!(short < long);
}

#[test]
fn test_decode_rejects_wrong_segment_count() {
    assert!(decode_connection_key("c!a").is_err());
    assert!(decode_stats_key("c!a!b").is_err());
    assert!(decode_stats_key("c!!a").is_err());
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_ids_outside_alphabet_are_rejected() {
    assert!(validate_id("").is_err());
    assert!(validate_id("has space").is_err());
    assert!(validate_id("bang!").is_err());
    assert!(validate_id("ünï").is_err());
    assert!(validate_id("n9KUjqxCr5FKThSNXdzb7oqN8rYwScB2dUnNqxQxbEA17JkaWy5x").is_ok());
}

#[test]
fn test_invalid_segment_fails_encoding() {
    assert!(matches!(
        encode_connection_key("c1", "a b", "c"),
        Err(CrawlError::KeyFormat(_))
    ));
}

#[test]
fn test_connection_pair_parsing() {
    assert_eq!(parse_connection_pair("a,b").unwrap(), ("a", "b"));
    assert!(parse_connection_pair("ab").is_err());
    assert!(parse_connection_pair("a,b,c").is_err());
    assert!(parse_connection_pair(",b").is_err());
}
