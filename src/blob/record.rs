//! Blob log record layout
//!
//! Encodes new records and decodes record headers during the open scan.

use std::io::Read;
use std::path::Path;

use bytes::{BufMut, BytesMut};

use crate::error::{Result, VaultError};

/// Status byte: 1 byte
pub const STATUS_SIZE: u64 = 1;

/// Length prefix: u32 little-endian
pub const LEN_SIZE: u64 = 4;

/// Largest value (and key) a u32 length prefix can describe
pub const MAX_VALUE_LEN: u64 = u32::MAX as u64;

/// Record status stored in the first byte of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordStatus {
    /// Tombstoned by `remove`
    Deleted = 0,
    /// Indexed on open
    Live = 1,
}

impl TryFrom<u8> for RecordStatus {
    type Error = u8;

    fn try_from(byte: u8) -> std::result::Result<Self, u8> {
        match byte {
            0 => Ok(RecordStatus::Deleted),
            1 => Ok(RecordStatus::Live),
            other => Err(other),
        }
    }
}

/// Total on-disk length of a record
pub fn record_len(key_len: u64, value_len: u64) -> u64 {
    STATUS_SIZE + LEN_SIZE + key_len + LEN_SIZE + value_len
}

/// Distance from the record start to its first value byte
pub fn value_offset_in_record(key_len: u64) -> u64 {
    STATUS_SIZE + LEN_SIZE + key_len + LEN_SIZE
}

/// Encode a live record into one contiguous buffer
///
/// Callers validate the value length first; the key length is checked here.
pub fn encode_record(key: &str, value: &[u8]) -> Result<BytesMut> {
    let key_bytes = key.as_bytes();
    let key_len = u32::try_from(key_bytes.len()).map_err(|_| VaultError::KeyTooLarge {
        size: key_bytes.len() as u64,
        max: MAX_VALUE_LEN,
    })?;
    let value_len = u32::try_from(value.len()).map_err(|_| VaultError::ValueTooLarge {
        key: key.to_string(),
        size: value.len() as u64,
        max: MAX_VALUE_LEN,
    })?;

    let mut buf = BytesMut::with_capacity(record_len(key_len as u64, value_len as u64) as usize);
    buf.put_u8(RecordStatus::Live as u8);
    buf.put_u32_le(key_len);
    buf.put_slice(key_bytes);
    buf.put_u32_le(value_len);
    buf.put_slice(value);
    Ok(buf)
}

/// Everything in a record except the value bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub status: RecordStatus,
    pub key: String,
    pub value_len: u32,
}

impl RecordHeader {
    /// Read a header from `reader`, which must be positioned at a record start
    ///
    /// `path` only feeds error messages.
    pub fn read_from<R: Read>(reader: &mut R, path: &Path) -> Result<Self> {
        let mut status_byte = [0u8; STATUS_SIZE as usize];
        read_exact_or_corrupt(reader, &mut status_byte, path, "status byte")?;
        let status = RecordStatus::try_from(status_byte[0]).map_err(|byte| {
            VaultError::corrupt(path, format!("Invalid status byte: {}, expected 0 or 1", byte))
        })?;

        let key_len = read_u32_le(reader, path, "key length")?;
        // A corrupt length must not turn into a huge allocation
        let mut key_bytes = Vec::new();
        reader.by_ref().take(key_len as u64).read_to_end(&mut key_bytes)?;
        if key_bytes.len() < key_len as usize {
            return Err(VaultError::corrupt(path, "Truncated record: file ends inside the key"));
        }
        let key = String::from_utf8(key_bytes)
            .map_err(|_| VaultError::corrupt(path, "Key is not valid UTF-8"))?;

        let value_len = read_u32_le(reader, path, "value length")?;

        Ok(Self {
            status,
            key,
            value_len,
        })
    }

    /// On-disk length of the whole record this header belongs to
    pub fn record_len(&self) -> u64 {
        record_len(self.key.len() as u64, self.value_len as u64)
    }

    /// Distance from the record start to the value
    pub fn value_offset(&self) -> u64 {
        value_offset_in_record(self.key.len() as u64)
    }
}

fn read_u32_le<R: Read>(reader: &mut R, path: &Path, what: &str) -> Result<u32> {
    let mut buf = [0u8; LEN_SIZE as usize];
    read_exact_or_corrupt(reader, &mut buf, path, what)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_exact_or_corrupt<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    path: &Path,
    what: &str,
) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            VaultError::corrupt(path, format!("Truncated record: file ends inside the {}", what))
        } else {
            VaultError::Io(e)
        }
    })
}
