//! Blob Log Module
//!
//! Append-only key/value log for binary blobs (pronunciation audio).
//!
//! ## Responsibilities
//! - Append records, never rewrite them (except the status byte)
//! - Rebuild the key index with a full scan on open
//! - Tombstone on remove and report reclaimable bytes
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Record 1                                                 │
//! │ ┌──────────┬───────────┬─────┬───────────┬───────────┐   │
//! │ │Status (1)│KeyLen (4) │ Key │ValLen (4) │   Value   │   │
//! │ └──────────┴───────────┴─────┴───────────┴───────────┘   │
//! ├──────────────────────────────────────────────────────────┤
//! │ Record 2 ...                                             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//! Lengths are u32 little-endian. Status is 1 for live, 0 for deleted.
//! No header, footer or padding.
//!
//! ## Concurrency
//! Single writer. Every method that touches the file takes `&mut self`;
//! share a log between threads behind a lock (see `Vault`).

mod store;
mod record;
mod scan;

pub use store::BlobLog;
pub use record::{
    encode_record, record_len, RecordHeader, RecordStatus, LEN_SIZE, MAX_VALUE_LEN, STATUS_SIZE,
};
pub use scan::{LogScanner, ScanResult};

/// Location of a live record inside the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Offset of the status byte
    pub record_offset: u64,

    /// Offset of the first value byte
    pub value_offset: u64,

    /// Value length in bytes
    pub value_len: u32,
}

impl IndexEntry {
    /// On-disk length of the record
    pub fn record_len(&self) -> u64 {
        self.value_offset - self.record_offset + self.value_len as u64
    }
}
