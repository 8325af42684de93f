//! Blob Log
//!
//! Open/append/read/tombstone over a single log file.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{Result, VaultError};

use super::record::{encode_record, value_offset_in_record, RecordStatus, MAX_VALUE_LEN};
use super::scan::LogScanner;
use super::IndexEntry;

/// Append-only blob store backed by one file
///
/// Created closed; call [`BlobLog::open`] before anything else.
/// The index lives only in memory and is rebuilt from the file on every open.
pub struct BlobLog {
    /// Log file location
    path: PathBuf,

    /// When to fsync mutations
    sync_strategy: SyncStrategy,

    /// Open handle, `None` while closed
    file: Option<File>,

    /// Live key → record location
    index: HashMap<String, IndexEntry>,

    /// Summed length of tombstoned records
    reclaimable_bytes: u64,
}

impl BlobLog {
    /// Create a closed handle for the log at `path`
    pub fn new(path: impl Into<PathBuf>, sync_strategy: SyncStrategy) -> Self {
        Self {
            path: path.into(),
            sync_strategy,
            file: None,
            index: HashMap::new(),
            reclaimable_bytes: 0,
        }
    }

    /// Scan the log, build the index and keep the file open
    ///
    /// Creates an empty log if the file does not exist.
    /// No-op when already open. On `CorruptFormat` the handle stays closed.
    pub fn open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)?;

        let scan = LogScanner::scan(&self.path)?;

        tracing::info!(
            path = %self.path.display(),
            live = scan.live_records,
            deleted = scan.dead_records,
            file_size = scan.file_size,
            "blob log opened"
        );
        if scan.reclaimable_bytes > 0 {
            tracing::warn!(
                path = %self.path.display(),
                bytes = scan.reclaimable_bytes,
                "blob log has space reclaimable by compaction"
            );
        }

        self.index = scan.index;
        self.reclaimable_bytes = scan.reclaimable_bytes;
        self.file = Some(file);
        Ok(())
    }

    /// True if `key` has a live record
    pub fn has(&self, key: &str) -> Result<bool> {
        self.ensure_open("checking a key")?;
        Ok(self.index.contains_key(key))
    }

    /// Append `value` under `key`
    ///
    /// Writing a key that is already live succeeds without touching the file.
    pub fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.ensure_open("writing")?;

        if value.is_empty() {
            return Err(VaultError::EmptyValue(key.to_string()));
        }
        if value.len() as u64 > MAX_VALUE_LEN {
            return Err(VaultError::ValueTooLarge {
                key: key.to_string(),
                size: value.len() as u64,
                max: MAX_VALUE_LEN,
            });
        }

        if self.index.contains_key(key) {
            tracing::debug!(key, "value already exists, write skipped");
            return Ok(());
        }

        let record = encode_record(key, value)?;
        let sync = self.sync_strategy;
        let file = self.file_mut("writing")?;

        let record_offset = file.seek(SeekFrom::End(0))?;
        let appended = match file.write_all(&record) {
            Ok(()) if sync == SyncStrategy::EveryWrite => file.sync_data(),
            other => other,
        };

        if let Err(e) = appended {
            // Drop the torn tail so the next scan does not reject the file
            if let Err(trunc) = file.set_len(record_offset) {
                tracing::error!(error = %trunc, offset = record_offset, "failed to truncate torn append");
            }
            return Err(VaultError::Io(e));
        }

        let entry = IndexEntry {
            record_offset,
            value_offset: record_offset + value_offset_in_record(key.len() as u64),
            value_len: value.len() as u32,
        };
        self.index.insert(key.to_string(), entry);
        Ok(())
    }

    /// Read the value stored under `key`
    pub fn read(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        self.ensure_open("reading")?;

        let entry = match self.index.get(key) {
            Some(&entry) => entry,
            None => return Ok(None),
        };

        let file = self.file_mut("reading")?;
        file.seek(SeekFrom::Start(entry.value_offset))?;
        let mut value = vec![0u8; entry.value_len as usize];
        file.read_exact(&mut value)?;
        Ok(Some(value))
    }

    /// Tombstone the record for `key`
    ///
    /// Returns false if the key is not live. The record bytes stay on disk.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        self.ensure_open("removing")?;

        let entry = match self.index.get(key) {
            Some(&entry) => entry,
            None => return Ok(false),
        };

        let sync = self.sync_strategy;
        let file = self.file_mut("removing")?;
        file.seek(SeekFrom::Start(entry.record_offset))?;
        file.write_all(&[RecordStatus::Deleted as u8])?;
        if sync == SyncStrategy::EveryWrite {
            file.sync_data()?;
        }

        self.index.remove(key);
        self.reclaimable_bytes += entry.record_len();
        Ok(true)
    }

    /// Flush and release the file handle
    ///
    /// The index is dropped too; a later `open` rescans the file.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            if self.sync_strategy == SyncStrategy::EveryWrite {
                file.sync_all()?;
            }
            tracing::debug!(path = %self.path.display(), "blob log closed");
        }
        self.index.clear();
        self.reclaimable_bytes = 0;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Location of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `open` has been called (and `close` has not)
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes held by tombstoned records (informational, nothing reclaims them)
    pub fn reclaimable_bytes(&self) -> u64 {
        self.reclaimable_bytes
    }

    /// Live keys in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Location of the live record for `key`
    pub fn entry(&self, key: &str) -> Option<IndexEntry> {
        self.index.get(key).copied()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn ensure_open(&self, op: &'static str) -> Result<()> {
        if self.file.is_none() {
            return Err(VaultError::NotOpen(op));
        }
        Ok(())
    }

    fn file_mut(&mut self, op: &'static str) -> Result<&mut File> {
        self.file.as_mut().ok_or(VaultError::NotOpen(op))
    }
}

impl Drop for BlobLog {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to close blob log");
        }
    }
}
