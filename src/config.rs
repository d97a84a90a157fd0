//! Configuration for crawlstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a crawlstore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the durable store
    /// Internal structure:
    ///   {data_dir}/
    ///     └── store.wal        (write-ahead log, replayed on open)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    // -------------------------------------------------------------------------
    // Schema Configuration
    // -------------------------------------------------------------------------
    /// Drop and recreate every table when the repository initializes its schema
    pub recreate_tables: bool,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./crawlstore_data"),
            wal_sync_strategy: WalSyncStrategy::EveryNEntries { count: 100 },
            recreate_tables: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Drop and recreate tables on schema initialization
    pub fn recreate_tables(mut self, recreate: bool) -> Self {
        self.config.recreate_tables = recreate;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
