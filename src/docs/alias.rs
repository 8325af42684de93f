//! Alias index
//!
//! A document may start with a two-line header:
//! ```text
//! [ALIAS]
//! <alias text>
//! ```
//! The index maps logical document paths to those aliases. It is rebuilt from
//! the files on open and updated in place by create/rewrite, so after a crash
//! or a lenient rename it can differ from the files until the next rebuild.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

use super::tree::{self, TreeEntry};

/// First line of the alias header
pub const ALIAS_HEADER: &str = "[ALIAS]";

/// Extract the alias from a document body
///
/// Only the first two lines are considered. A blank alias counts as none.
pub fn parse_alias(text: &str) -> Option<String> {
    let mut lines = text.lines();
    if lines.next()? != ALIAS_HEADER {
        return None;
    }
    let alias = lines.next()?.trim();
    if alias.is_empty() {
        None
    } else {
        Some(alias.to_string())
    }
}

/// Read just enough of a document to find its alias
pub fn read_alias(path: &Path) -> Result<Option<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut head = String::new();
    for line in reader.lines().take(2) {
        match line {
            Ok(line) => {
                head.push_str(&line);
                head.push('\n');
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(path = %path.display(), "document is not UTF-8, no alias read");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(parse_alias(&head))
}

/// Logical path → alias
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AliasIndex {
    entries: BTreeMap<String, String>,
}

impl AliasIndex {
    /// Scan every document under `root` (trash included)
    pub fn build(root: &Path) -> Result<Self> {
        let mut index = Self::default();
        tree::walk(root, &mut |entry: TreeEntry| {
            if entry.node.is_dir {
                return Ok(());
            }
            if let Some(alias) = read_alias(&entry.fs_path)? {
                index.entries.insert(entry.node.path, alias);
            }
            Ok(())
        })?;
        Ok(index)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Set the alias for `path`, returning the previous one
    pub fn set(&mut self, path: impl Into<String>, alias: impl Into<String>) -> Option<String> {
        self.entries.insert(path.into(), alias.into())
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.entries.remove(path)
    }

    /// Re-key a single entry
    pub fn move_entry(&mut self, from: &str, to: &str) {
        if let Some(alias) = self.entries.remove(from) {
            self.entries.insert(to.to_string(), alias);
        }
    }

    /// Re-key every entry below directory `from` to directory `to`
    pub fn move_prefix(&mut self, from: &str, to: &str) {
        let from_prefix = format!("{}/", from);
        let moved: Vec<String> = self
            .entries
            .range(from_prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&from_prefix))
            .map(|(key, _)| key.clone())
            .collect();

        for key in moved {
            if let Some(alias) = self.entries.remove(&key) {
                let rest = &key[from_prefix.len()..];
                self.entries.insert(format!("{}/{}", to, rest), alias);
            }
        }
    }

    /// Drop every entry below directory `dir`
    pub fn remove_prefix(&mut self, dir: &str) {
        let prefix = format!("{}/", dir);
        self.entries.retain(|key, _| !key.starts_with(&prefix));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by path
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}
