//! Write-Ahead Log (WAL)
//!
//! Durability for [`LogStore`](super::LogStore): every mutation is appended
//! here before it is applied in memory, and replayed on open.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2 ...                             │
//! └─────────────────────────────────────────┘
//! ```
//! All integers little-endian; CRC32 covers `Data` (a bincode `Mutation`).

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::config::WalSyncStrategy;
use crate::error::{CrawlError, Result};
use crate::schema::TableDescriptor;
use super::Cells;

/// LSN (8) + CRC (4) + payload length (4)
pub const HEADER_SIZE: usize = 16;

/// Upper bound on a single frame's payload
pub const MAX_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;

/// A logged store mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    CreateTable(TableDescriptor),
    DeleteTable(TableDescriptor),
    PutRows {
        table: String,
        rows: BTreeMap<String, Cells>,
    },
}

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The mutation to re-apply
    pub mutation: Mutation,
}

impl WalEntry {
    /// Frame the entry: header followed by the bincode payload
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(&self.mutation)?;
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(CrawlError::Serialization(format!(
                "WAL payload too large: {} bytes (max {})",
                payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }
        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&self.lsn.to_le_bytes());
        frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Decode one frame at the start of `bytes`
    ///
    /// Returns the entry and the frame length, or `None` when the bytes do
    /// not hold a complete, checksum-valid frame.
    fn deserialize_prefix(bytes: &[u8]) -> Option<(Self, usize)> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }
        let lsn = u64::from_le_bytes(bytes[0..8].try_into().ok()?);
        let crc = u32::from_le_bytes(bytes[8..12].try_into().ok()?);
        let len = u32::from_le_bytes(bytes[12..16].try_into().ok()?) as usize;
        if len > MAX_PAYLOAD_SIZE || bytes.len() < HEADER_SIZE + len {
            return None;
        }
        let payload = &bytes[HEADER_SIZE..HEADER_SIZE + len];
        if crc32fast::hash(payload) != crc {
            return None;
        }
        let mutation = bincode::deserialize(payload).ok()?;
        Some((Self { lsn, mutation }, HEADER_SIZE + len))
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Appends entries to the WAL file
///
/// The writer tracks the length of the file up to its last complete frame.
/// A failed write is cut back to that length so later frames never land
/// behind a torn one; if the cut itself fails the writer refuses further
/// appends.
pub struct WalWriter {
    file: File,
    next_lsn: u64,
    sync_strategy: WalSyncStrategy,
    unsynced: usize,
    /// File length after the last acknowledged frame
    valid_len: u64,
    failed: bool,
}

impl WalWriter {
    /// Open or create a WAL file; `last_lsn` is the highest LSN already in it
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy, last_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let valid_len = file.metadata()?.len();
        Ok(Self {
            file,
            next_lsn: last_lsn + 1,
            sync_strategy,
            unsynced: 0,
            valid_len,
            failed: false,
        })
    }

    /// Append a mutation, returning its LSN
    pub fn append(&mut self, mutation: Mutation) -> Result<u64> {
        if self.failed {
            return Err(CrawlError::StoreUnavailable(
                "WAL writer failed earlier and no longer accepts appends".to_string(),
            ));
        }
        let entry = WalEntry {
            lsn: self.next_lsn,
            mutation,
        };
        let frame = entry.serialize()?;

        self.discard_torn_tail()?;
        if let Err(e) = self.write_frame(&frame) {
            self.roll_back();
            return Err(e);
        }
        self.valid_len += frame.len() as u64;
        self.next_lsn += 1;
        Ok(entry.lsn)
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.file.write_all(frame)?;
        self.unsynced += 1;
        let due = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.unsynced >= count,
        };
        if due {
            self.sync()?;
        }
        Ok(())
    }

    /// Cut off bytes past the last acknowledged frame
    fn discard_torn_tail(&mut self) -> Result<()> {
        let len = self.file.metadata()?.len();
        if len != self.valid_len {
            warn!(
                valid_len = self.valid_len,
                file_len = len,
                "discarding bytes past the last acknowledged WAL frame"
            );
            if let Err(e) = self.file.set_len(self.valid_len) {
                self.failed = true;
                return Err(e.into());
            }
        }
        Ok(())
    }

    fn roll_back(&mut self) {
        if let Err(e) = self.file.set_len(self.valid_len) {
            warn!(error = %e, "cannot roll back failed WAL append");
            self.failed = true;
        }
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// LSN the next append will receive
    pub fn next_lsn(&self) -> u64 {
        self.next_lsn
    }
}

// =============================================================================
// Recovery
// =============================================================================

/// Result of a replay
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Bytes after the last valid frame that were discarded
    pub bytes_discarded: u64,

    /// Last valid LSN (0 for an empty log)
    pub last_lsn: u64,

    /// Whether the WAL was truncated (torn or corrupt tail removed)
    pub was_truncated: bool,
}

/// Read every valid entry and cut the file after the last one
///
/// Replay stops at the first incomplete frame, checksum mismatch, or
/// non-increasing LSN; everything from there on is dropped.
pub fn replay(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
    let mut result = RecoveryResult::default();
    if !path.exists() {
        return Ok((Vec::new(), result));
    }

    let bytes = fs::read(path)?;
    let mut entries = Vec::new();
    let mut offset = 0;

    while let Some((entry, len)) = WalEntry::deserialize_prefix(&bytes[offset..]) {
        if entry.lsn <= result.last_lsn {
            break;
        }
        result.last_lsn = entry.lsn;
        result.entries_recovered += 1;
        offset += len;
        entries.push(entry);
    }

    if offset < bytes.len() {
        result.bytes_discarded = (bytes.len() - offset) as u64;
        result.was_truncated = true;
        warn!(
            path = %path.display(),
            valid_bytes = offset,
            discarded = result.bytes_discarded,
            "truncating WAL after last valid entry"
        );
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(offset as u64)?;
        file.sync_all()?;
    }

    debug!(
        entries = result.entries_recovered,
        last_lsn = result.last_lsn,
        "WAL replayed"
    );
    Ok((entries, result))
}
