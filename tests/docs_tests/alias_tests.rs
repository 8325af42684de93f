//! Tests for the alias index
//!
//! These tests verify:
//! - The index is built from document headers on open
//! - create/rewrite set the alias passed by the caller
//! - Lenient mode leaves stale entries after rename/delete
//! - Strict mode moves and drops entries along with the files
//! - rebuild_aliases resynchronises with the files

use std::fs;

use lexivault::docs::{parse_alias, read_alias};
use lexivault::{AliasMaintenance, DocumentStore};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store(mode: AliasMaintenance) -> (TempDir, DocumentStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::open(temp_dir.path(), mode).unwrap();
    (temp_dir, store)
}

fn with_alias(alias: &str, body: &str) -> String {
    format!("[ALIAS]\n{}\n{}", alias, body)
}

// =============================================================================
// Header Parsing Tests
// =============================================================================

#[test]
fn test_parse_alias_header() {
    assert_eq!(parse_alias("[ALIAS]\nder Hund\nrest"), Some("der Hund".to_string()));
    assert_eq!(parse_alias("[ALIAS]\n  padded  "), Some("padded".to_string()));
    assert_eq!(parse_alias("[ALIAS]\n"), None);
    assert_eq!(parse_alias("[ALIAS]"), None);
    assert_eq!(parse_alias("text\n[ALIAS]\nlate"), None);
    assert_eq!(parse_alias(""), None);
}

#[test]
fn test_read_alias_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("doc.txt");
    fs::write(&path, with_alias("Katze", "long body\nmore")).unwrap();

    assert_eq!(read_alias(&path).unwrap(), Some("Katze".to_string()));
}

#[test]
fn test_read_alias_non_utf8_is_none() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("doc.txt");
    fs::write(&path, [0xff, 0xfe, b'\n', 0xff]).unwrap();

    assert_eq!(read_alias(&path).unwrap(), None);
}

// =============================================================================
// Build Tests
// =============================================================================

#[test]
fn test_index_built_on_open() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("words")).unwrap();
    fs::create_dir_all(root.join("trash")).unwrap();
    fs::write(root.join("words").join("dog.txt"), with_alias("Hund", "")).unwrap();
    fs::write(root.join("words").join("plain.txt"), "no header").unwrap();
    fs::write(root.join("trash").join("cat.txt"), with_alias("Katze", "")).unwrap();

    let store = DocumentStore::open(root, AliasMaintenance::Lenient).unwrap();

    assert_eq!(store.aliases().len(), 2);
    assert_eq!(store.alias("words/dog"), Some("Hund"));
    assert_eq!(store.alias("trash/cat"), Some("Katze"));
    assert_eq!(store.alias("words/plain"), None);
}

#[test]
fn test_index_iterates_sorted() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Lenient);
    store.create("b", "B", "").unwrap();
    store.create("a", "A", "").unwrap();

    let entries: Vec<(&str, &str)> = store.aliases().iter().collect();

    assert_eq!(entries, vec![("a", "A"), ("b", "B")]);
    assert_eq!(store.aliases().as_map().get("b").map(String::as_str), Some("B"));
}

#[test]
fn test_index_serializes_as_plain_map() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Lenient);
    store.create("w/dog", "Hund", "").unwrap();

    let json = serde_json::to_value(store.aliases()).unwrap();

    assert_eq!(json, serde_json::json!({"w/dog": "Hund"}));
}

// =============================================================================
// Create/Rewrite Tests
// =============================================================================

#[test]
fn test_create_sets_alias() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Lenient);

    store.create("dog", "Hund", &with_alias("Hund", "a dog")).unwrap();

    assert_eq!(store.alias("dog"), Some("Hund"));
}

#[test]
fn test_create_sets_alias_even_without_header() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Lenient);

    store.create("dog", "", &with_alias("Hund", "")).unwrap();

    // the caller's alias wins until the next rebuild
    assert_eq!(store.alias("dog"), Some(""));

    store.rebuild_aliases().unwrap();
    assert_eq!(store.alias("dog"), Some("Hund"));
}

#[test]
fn test_rewrite_updates_alias() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Lenient);
    store.create("dog", "Hund", &with_alias("Hund", "")).unwrap();

    store.rewrite("dog", "der Hund", &with_alias("der Hund", "")).unwrap();

    assert_eq!(store.alias("dog"), Some("der Hund"));
}

#[test]
fn test_aliases_survive_reopen() {
    let temp = TempDir::new().unwrap();
    {
        let mut store = DocumentStore::open(temp.path(), AliasMaintenance::Lenient).unwrap();
        store.create("w/dog", "Hund", &with_alias("Hund", "")).unwrap();
    }

    let store = DocumentStore::open(temp.path(), AliasMaintenance::Lenient).unwrap();

    assert_eq!(store.alias("w/dog"), Some("Hund"));
}

// =============================================================================
// Lenient Mode Tests
// =============================================================================

#[test]
fn test_lenient_rename_leaves_stale_alias() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Lenient);
    store.create("old", "A", &with_alias("A", "")).unwrap();

    store.rename("old", "new").unwrap();

    assert_eq!(store.alias("old"), Some("A"));
    assert_eq!(store.alias("new"), None);

    store.rebuild_aliases().unwrap();
    assert_eq!(store.alias("old"), None);
    assert_eq!(store.alias("new"), Some("A"));
}

#[test]
fn test_lenient_delete_leaves_stale_alias() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Lenient);
    store.create("doc", "A", &with_alias("A", "")).unwrap();

    store.delete("doc").unwrap();

    assert_eq!(store.alias("doc"), Some("A"));
    assert_eq!(store.alias("trash/doc"), None);
}

// =============================================================================
// Strict Mode Tests
// =============================================================================

#[test]
fn test_strict_rename_moves_alias() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Strict);
    store.create("old", "A", &with_alias("A", "")).unwrap();

    store.rename("old", "new").unwrap();

    assert_eq!(store.alias("old"), None);
    assert_eq!(store.alias("new"), Some("A"));
}

#[test]
fn test_strict_directory_rename_moves_prefix() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Strict);
    store.create("src/a", "A", &with_alias("A", "")).unwrap();
    store.create("src/sub/b", "B", &with_alias("B", "")).unwrap();
    store.create("srcx", "X", &with_alias("X", "")).unwrap();

    store.rename("src/", "dst/").unwrap();

    assert_eq!(store.alias("dst/a"), Some("A"));
    assert_eq!(store.alias("dst/sub/b"), Some("B"));
    assert_eq!(store.alias("src/a"), None);
    // sibling sharing the name prefix is untouched
    assert_eq!(store.alias("srcx"), Some("X"));
}

#[test]
fn test_strict_delete_follows_document() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Strict);
    store.create("dir/doc", "A", &with_alias("A", "")).unwrap();

    store.delete("dir/doc").unwrap();
    assert_eq!(store.alias("dir/doc"), None);
    assert_eq!(store.alias("trash/dir/doc"), Some("A"));

    store.delete("trash/dir/doc").unwrap();
    assert_eq!(store.alias("trash/dir/doc"), None);
    assert!(store.aliases().is_empty());
}

#[test]
fn test_strict_emptying_trash_drops_aliases() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Strict);
    store.create("a", "A", &with_alias("A", "")).unwrap();
    store.create("d/b", "B", &with_alias("B", "")).unwrap();
    store.delete("a").unwrap();
    store.delete("d/").unwrap();
    assert_eq!(store.aliases().len(), 2);

    store.delete("trash/").unwrap();

    assert!(store.aliases().is_empty());
}

#[test]
fn test_strict_index_matches_rebuild() {
    let (_temp, mut store) = setup_store(AliasMaintenance::Strict);
    store.create("x/one", "1", &with_alias("1", "")).unwrap();
    store.create("x/two", "2", &with_alias("2", "")).unwrap();
    store.rename("x/", "y/").unwrap();
    store.delete("y/one").unwrap();

    let maintained = store.aliases().clone();
    store.rebuild_aliases().unwrap();

    assert_eq!(&maintained, store.aliases());
}
