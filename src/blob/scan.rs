//! Blob log scan
//!
//! Rebuilds the key index by reading every record header from offset 0.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Result, VaultError};

use super::record::{RecordHeader, RecordStatus};
use super::IndexEntry;

/// Scans a blob log file without keeping it open
pub struct LogScanner;

/// Result of a full scan
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Live key → location
    pub index: HashMap<String, IndexEntry>,

    /// Number of live records
    pub live_records: u64,

    /// Number of tombstoned records
    pub dead_records: u64,

    /// Summed length of tombstoned records
    pub reclaimable_bytes: u64,

    /// File size at scan time
    pub file_size: u64,
}

impl LogScanner {
    /// Scan the whole file and index every live record
    ///
    /// Fails with `CorruptFormat` on:
    /// 1. A status byte other than 0 or 1
    /// 2. A live key seen twice
    /// 3. A record that runs past the end of the file
    pub fn scan(path: &Path) -> Result<ScanResult> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut result = ScanResult {
            file_size,
            ..ScanResult::default()
        };

        let mut cursor: u64 = 0;
        while cursor < file_size {
            let header = RecordHeader::read_from(&mut reader, path)?;
            let record_len = header.record_len();

            if cursor + record_len > file_size {
                return Err(VaultError::corrupt(
                    path,
                    format!(
                        "Truncated record at offset {}: needs {} bytes, {} left",
                        cursor,
                        record_len,
                        file_size - cursor
                    ),
                ));
            }

            match header.status {
                RecordStatus::Live => {
                    if result.index.contains_key(&header.key) {
                        return Err(VaultError::corrupt(
                            path,
                            format!("Duplicated key {} was found. Key should be unique.", header.key),
                        ));
                    }
                    let entry = IndexEntry {
                        record_offset: cursor,
                        value_offset: cursor + header.value_offset(),
                        value_len: header.value_len,
                    };
                    result.index.insert(header.key, entry);
                    result.live_records += 1;
                }
                RecordStatus::Deleted => {
                    tracing::trace!(key = %header.key, offset = cursor, "skipping deleted record");
                    result.dead_records += 1;
                    result.reclaimable_bytes += record_len;
                }
            }

            // Skip the value bytes
            reader.seek_relative(header.value_len as i64)?;
            cursor += record_len;
        }

        Ok(result)
    }
}
