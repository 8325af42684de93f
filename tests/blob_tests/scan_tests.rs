//! Tests for the blob log file format and open-time scan
//!
//! These tests verify:
//! - The on-disk layout is bit-exact
//! - Scans of hand-crafted files (live, deleted, mixed)
//! - Corruption detection (bad status, duplicate live key, torn tail)
//! - A corrupt file keeps the log closed

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use lexivault::blob::{record_len, BlobLog, LogScanner};
use lexivault::{SyncStrategy, VaultError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.bin");
    (temp_dir, path)
}

/// Encode a record by hand, independent of the library encoder
fn raw_record(status: u8, key: &str, value: &[u8]) -> Vec<u8> {
    let mut bytes = vec![status];
    bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
    bytes.extend_from_slice(key.as_bytes());
    bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
    bytes.extend_from_slice(value);
    bytes
}

fn write_raw(path: &PathBuf, records: &[Vec<u8>]) {
    let mut file = File::create(path).unwrap();
    for record in records {
        file.write_all(record).unwrap();
    }
    file.sync_all().unwrap();
}

// =============================================================================
// Format Tests
// =============================================================================

#[test]
fn test_written_bytes_match_format() {
    let (_temp, path) = setup_temp_log();
    let mut log = BlobLog::new(&path, SyncStrategy::EveryWrite);
    log.open().unwrap();

    log.write("ja", b"\x01\x02\x03").unwrap();
    log.write("nein", b"!").unwrap();
    log.close().unwrap();

    let mut expected = raw_record(1, "ja", b"\x01\x02\x03");
    expected.extend(raw_record(1, "nein", b"!"));
    assert_eq!(fs::read(&path).unwrap(), expected);
}

#[test]
fn test_remove_flips_only_status_byte() {
    let (_temp, path) = setup_temp_log();
    let mut log = BlobLog::new(&path, SyncStrategy::EveryWrite);
    log.open().unwrap();
    log.write("a", b"first").unwrap();
    log.write("b", b"second").unwrap();

    log.remove("b").unwrap();
    log.close().unwrap();

    let mut expected = raw_record(1, "a", b"first");
    expected.extend(raw_record(0, "b", b"second"));
    assert_eq!(fs::read(&path).unwrap(), expected);
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_empty_file() {
    let (_temp, path) = setup_temp_log();
    File::create(&path).unwrap();

    let result = LogScanner::scan(&path).unwrap();

    assert!(result.index.is_empty());
    assert_eq!(result.live_records, 0);
    assert_eq!(result.dead_records, 0);
    assert_eq!(result.reclaimable_bytes, 0);
    assert_eq!(result.file_size, 0);
}

#[test]
fn test_scan_indexes_offsets() {
    let (_temp, path) = setup_temp_log();
    write_raw(
        &path,
        &[raw_record(1, "eins", b"1111"), raw_record(1, "zwei", b"22")],
    );

    let result = LogScanner::scan(&path).unwrap();

    let first = result.index["eins"];
    assert_eq!(first.record_offset, 0);
    assert_eq!(first.value_offset, 1 + 4 + 4 + 4);
    assert_eq!(first.value_len, 4);

    let second = result.index["zwei"];
    assert_eq!(second.record_offset, record_len(4, 4));
    assert_eq!(second.value_offset, record_len(4, 4) + 13);
    assert_eq!(second.value_len, 2);
    assert_eq!(second.record_len(), record_len(4, 2));
}

#[test]
fn test_scan_mixed_live_and_deleted() {
    let (_temp, path) = setup_temp_log();
    write_raw(
        &path,
        &[
            raw_record(0, "gone", b"xxxxxxxx"),
            raw_record(1, "kept", b"yy"),
            raw_record(0, "also-gone", b"z"),
        ],
    );

    let result = LogScanner::scan(&path).unwrap();

    assert_eq!(result.live_records, 1);
    assert_eq!(result.dead_records, 2);
    assert_eq!(result.reclaimable_bytes, record_len(4, 8) + record_len(9, 1));
    assert!(result.index.contains_key("kept"));
    assert!(!result.index.contains_key("gone"));
}

#[test]
fn test_scan_allows_dead_then_live_same_key() {
    let (_temp, path) = setup_temp_log();
    write_raw(
        &path,
        &[raw_record(0, "k", b"old"), raw_record(1, "k", b"new")],
    );

    let mut log = BlobLog::new(&path, SyncStrategy::Never);
    log.open().unwrap();

    assert_eq!(log.read("k").unwrap(), Some(b"new".to_vec()));
    assert_eq!(log.reclaimable_bytes(), record_len(1, 3));
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_invalid_status_byte() {
    let (_temp, path) = setup_temp_log();
    write_raw(&path, &[raw_record(1, "ok", b"1"), raw_record(7, "bad", b"2")]);

    let err = LogScanner::scan(&path).unwrap_err();

    match err {
        VaultError::CorruptFormat { details, .. } => assert!(details.contains("7")),
        other => panic!("expected CorruptFormat, got {:?}", other),
    }
}

#[test]
fn test_duplicate_live_key() {
    let (_temp, path) = setup_temp_log();
    write_raw(&path, &[raw_record(1, "k", b"a"), raw_record(1, "k", b"b")]);

    let err = LogScanner::scan(&path).unwrap_err();

    match err {
        VaultError::CorruptFormat { details, .. } => assert!(details.contains("Duplicated key k")),
        other => panic!("expected CorruptFormat, got {:?}", other),
    }
}

#[test]
fn test_torn_value_is_corrupt() {
    let (_temp, path) = setup_temp_log();
    let mut record = raw_record(1, "k", b"0123456789");
    record.truncate(record.len() - 3);
    write_raw(&path, &[raw_record(1, "ok", b"1"), record]);

    assert!(matches!(
        LogScanner::scan(&path),
        Err(VaultError::CorruptFormat { .. })
    ));
}

#[test]
fn test_torn_header_is_corrupt() {
    let (_temp, path) = setup_temp_log();
    write_raw(&path, &[raw_record(1, "ok", b"1"), vec![1, 5, 0]]);

    assert!(matches!(
        LogScanner::scan(&path),
        Err(VaultError::CorruptFormat { .. })
    ));
}

#[test]
fn test_non_utf8_key_is_corrupt() {
    let (_temp, path) = setup_temp_log();
    let mut record = vec![1u8];
    record.extend_from_slice(&2u32.to_le_bytes());
    record.extend_from_slice(&[0xff, 0xfe]);
    record.extend_from_slice(&1u32.to_le_bytes());
    record.push(b'v');
    write_raw(&path, &[record]);

    assert!(matches!(
        LogScanner::scan(&path),
        Err(VaultError::CorruptFormat { .. })
    ));
}

#[test]
fn test_corrupt_file_keeps_log_closed() {
    let (_temp, path) = setup_temp_log();
    write_raw(&path, &[raw_record(2, "k", b"v")]);

    let mut log = BlobLog::new(&path, SyncStrategy::Never);
    let err = log.open().unwrap_err();

    assert!(matches!(err, VaultError::CorruptFormat { .. }));
    assert!(!log.is_open());
    assert!(matches!(log.has("k"), Err(VaultError::NotOpen(_))));
}

#[test]
fn test_garbage_appended_after_close_is_detected() {
    let (_temp, path) = setup_temp_log();
    {
        let mut log = BlobLog::new(&path, SyncStrategy::Never);
        log.open().unwrap();
        log.write("k", b"v").unwrap();
        log.close().unwrap();
    }

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[9, 9, 9]).unwrap();
    drop(file);

    let mut log = BlobLog::new(&path, SyncStrategy::Never);
    assert!(matches!(log.open(), Err(VaultError::CorruptFormat { .. })));
}
