//! # crawlstore
//!
//! Persistence for successive crawls of a peer-to-peer network, with:
//! - Composite row keys whose byte order is the logical order
//!   (crawl → node → peer), so every read is a prefix or range scan
//! - Per-node topology deltas (peers added/dropped) between consecutive crawls
//! - A sparse node change log plus a latest-state table
//! - A pluggable wide-column store, with an in-memory and a WAL-backed
//!   implementation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CrawlRepository                          │
//! │        (store raw / processed crawls, typed reads)           │
//! └──────┬──────────────────┬───────────────────────┬───────────┘
//!        │                  │                       │
//!        ▼                  ▼                       ▼
//!   ┌─────────┐      ┌─────────────┐        ┌─────────────┐
//!   │  Delta  │      │    Keys     │        │  Normalize  │
//!   │ (diff)  │      │  (codec)    │        │  (read)     │
//!   └─────────┘      └─────────────┘        └──────┬──────┘
//!                                                  │
//!                  ┌───────────────────────────────▼───────────┐
//!                  │           ColumnStore (trait)             │
//!                  │      MemoryStore   ◀──   LogStore + WAL   │
//!                  └───────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod schema;
pub mod keys;
pub mod delta;
pub mod model;
pub mod normalize;
pub mod store;
pub mod repository;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CrawlError, Result, WriteGroup};
pub use config::Config;
pub use repository::{CrawlRepository, Direction};
pub use store::{ColumnStore, LogStore, MemoryStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of crawlstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
