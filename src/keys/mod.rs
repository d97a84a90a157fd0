//! Key Codec Module
//!
//! Composite row keys for the crawl keyspace.
//!
//! ## Responsibilities
//! - Encode (crawl, pubkey, peer) tuples into flat sortable strings
//! - Decode them back, rejecting malformed keys
//! - Build `[start, stop)` scan bounds for prefix scans
//!
//! ## Key Layout
//! ```text
//! raw_crawls        {start:020}_{end:020}           (epoch millis)
//! crawl_node_stats  {crawl}!{pubkey}
//! connections       {crawl}!{from}!{to}
//! nodes             {pubkey}!{crawl}                (pubkey-major)
//! node_state        {pubkey}
//! crawls            {crawl}
//! ```
//!
//! ## Ordering
//! Ids (crawl keys and pubkeys) are non-empty printable ASCII in
//! `0x22..=0x7E`. The segment separator `!` (0x21) sorts below every legal
//! id byte, so comparing encoded keys compares the tuples segment by segment,
//! and `prefix!` .. `prefix"` covers exactly the rows under `prefix`.

mod codec;
mod range;

pub use codec::{
    decode_connection_key, decode_node_key, decode_stats_key, decode_time_range_key,
    encode_connection_key, encode_node_key, encode_stats_key, encode_time_range_key,
    parse_connection_pair, validate_id, SEPARATOR, TIME_RANGE_SEPARATOR, TIME_WIDTH,
};
pub use range::KeyRange;
