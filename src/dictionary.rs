//! Dictionary Store
//!
//! Translation entries kept as one JSON array of objects, each carrying a
//! string `"key"` field:
//! ```text
//! [{"key": "dog", "ru": "собака"}, {"key": "cat", "ru": "кошка"}]
//! ```
//! The whole file is loaded into memory on open; `store` writes it back.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{Result, VaultError};

/// Field every entry must carry
pub const KEY_FIELD: &str = "key";

/// In-memory JSON dictionary backed by one file
pub struct Dictionary {
    path: PathBuf,
    /// Key → entry, in file order
    entries: Map<String, Value>,
}

impl Dictionary {
    /// Load the dictionary at `path` and write it back normalised
    ///
    /// A missing or empty file is an empty dictionary. When the same key
    /// appears twice the later entry wins but keeps the earlier position.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Map::new();
        if !raw.trim().is_empty() {
            let data: Value = serde_json::from_str(&raw)
                .map_err(|e| VaultError::corrupt(&path, format!("Invalid JSON: {}", e)))?;
            let items = match data {
                Value::Array(items) => items,
                _ => return Err(VaultError::corrupt(&path, "Expected a JSON array of entries")),
            };
            for (position, item) in items.into_iter().enumerate() {
                let key = entry_key(&item).ok_or_else(|| {
                    VaultError::corrupt(
                        &path,
                        format!("Entry {} is not an object with a string \"{}\"", position, KEY_FIELD),
                    )
                })?;
                entries.insert(key, item);
            }
        }

        let dictionary = Self { path, entries };
        dictionary.store()?;

        tracing::info!(
            path = %dictionary.path.display(),
            entries = dictionary.entries.len(),
            file_size = raw.len(),
            "dictionary loaded"
        );
        Ok(dictionary)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Add or replace an entry, returning the one it replaced
    ///
    /// A replaced entry keeps its position. Changes stay in memory until
    /// `store`.
    pub fn insert(&mut self, entry: Value) -> Result<Option<Value>> {
        let key = entry_key(&entry).ok_or_else(|| {
            VaultError::Serialization(format!(
                "dictionary entry must be an object with a string \"{}\"",
                KEY_FIELD
            ))
        })?;
        Ok(self.entries.insert(key, entry))
    }

    /// Remove an entry; changes stay in memory until `store`
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Write all entries to disk, replacing the file atomically
    pub fn store(&self) -> Result<()> {
        let items: Vec<&Value> = self.entries.values().collect();
        let data = serde_json::to_string(&items)
            .map_err(|e| VaultError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in file order, new keys last
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn entry_key(entry: &Value) -> Option<String> {
    entry.get(KEY_FIELD)?.as_str().map(str::to_string)
}
