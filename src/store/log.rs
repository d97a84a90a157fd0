//! Durable store
//!
//! A [`MemoryStore`] whose mutations are logged to a WAL first and replayed
//! on open.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use parking_lot::Mutex;
use tracing::{debug, info};
use crate::config::{Config, WalSyncStrategy};
use crate::error::{CrawlError, Result};
use crate::schema::TableDescriptor;
use super::wal::{self, Mutation, RecoveryResult, WalWriter};
use super::{Cells, ColumnStore, MemoryStore, RawRow, ScanRequest};

/// Write-ahead logged wide-column store
///
/// ## Concurrency:
/// - `wal` mutex is held across append + apply, so the log order and the
///   in-memory order of mutations are the same
/// - Reads go straight to the in-memory tables
pub struct LogStore {
    memory: MemoryStore,
    wal: Mutex<WalWriter>,
    wal_path: PathBuf,
    recovery: RecoveryResult,
}

impl LogStore {
    const WAL_FILENAME: &'static str = "store.wal";

    /// Open or create a store under `config.data_dir`
    pub fn open(config: &Config) -> Result<Self> {
        if let WalSyncStrategy::EveryNEntries { count: 0 } = config.wal_sync_strategy {
            return Err(CrawlError::Config(
                "WAL sync interval must be at least one entry".to_string(),
            ));
        }

        fs::create_dir_all(&config.data_dir)?;
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        let (entries, recovery) = wal::replay(&wal_path)?;
        let memory = MemoryStore::new();
        for entry in entries {
            // A mutation that failed when first issued fails the same way here
            if let Err(e) = apply(&memory, &entry.mutation) {
                debug!(lsn = entry.lsn, error = %e, "skipping rejected WAL entry");
            }
        }

        if recovery.entries_recovered > 0 || recovery.was_truncated {
            info!(
                entries = recovery.entries_recovered,
                last_lsn = recovery.last_lsn,
                truncated = recovery.was_truncated,
                "store recovered from WAL"
            );
        }

        let writer = WalWriter::open(&wal_path, config.wal_sync_strategy, recovery.last_lsn)?;
        Ok(Self {
            memory,
            wal: Mutex::new(writer),
            wal_path,
            recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(&Config::builder().data_dir(path).build())
    }

    /// What the last open recovered
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }

    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    /// The in-memory view of the tables
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Force sync of the WAL to disk
    pub fn sync(&self) -> Result<()> {
        self.wal.lock().sync().map_err(unavailable)
    }

    fn log_and_apply(&self, mutation: Mutation) -> Result<()> {
        let mut wal = self.wal.lock();
        // Only mutations that will apply are logged
        validate(&self.memory, &mutation)?;
        let lsn = wal.append(mutation.clone()).map_err(unavailable)?;
        debug!(lsn, "WAL append");
        apply(&self.memory, &mutation)
    }
}

fn unavailable(err: CrawlError) -> CrawlError {
    match err {
        CrawlError::Io(e) => CrawlError::StoreUnavailable(format!("WAL I/O failed: {}", e)),
        other => other,
    }
}

fn validate(memory: &MemoryStore, mutation: &Mutation) -> Result<()> {
    match mutation {
        Mutation::CreateTable(table) if memory.has_table(&table.name) => {
            Err(CrawlError::TableExists(table.name.clone()))
        }
        Mutation::DeleteTable(table) if !memory.has_table(&table.name) => {
            Err(CrawlError::UnknownTable(table.name.clone()))
        }
        Mutation::PutRows { table, rows } => memory.check_rows(table, rows),
        _ => Ok(()),
    }
}

fn apply(memory: &MemoryStore, mutation: &Mutation) -> Result<()> {
    match mutation {
        Mutation::CreateTable(table) => memory.create_table(table),
        Mutation::DeleteTable(table) => memory.delete_table(table),
        Mutation::PutRows { table, rows } => memory.put_rows(table, rows),
    }
}

impl ColumnStore for LogStore {
    fn create_table(&self, table: &TableDescriptor) -> Result<()> {
        self.log_and_apply(Mutation::CreateTable(table.clone()))
    }

    fn delete_table(&self, table: &TableDescriptor) -> Result<()> {
        self.log_and_apply(Mutation::DeleteTable(table.clone()))
    }

    fn put_row(&self, table: &str, row_key: &str, columns: &Cells) -> Result<()> {
        let mut rows = BTreeMap::new();
        rows.insert(row_key.to_string(), columns.clone());
        self.put_rows(table, &rows)
    }

    fn put_rows(&self, table: &str, rows: &BTreeMap<String, Cells>) -> Result<()> {
        self.log_and_apply(Mutation::PutRows {
            table: table.to_string(),
            rows: rows.clone(),
        })
    }

    fn get_row(&self, table: &str, row_key: &str) -> Result<RawRow> {
        self.memory.get_row(table, row_key)
    }

    fn scan(&self, request: &ScanRequest) -> Result<Vec<RawRow>> {
        self.memory.scan(request)
    }
}
