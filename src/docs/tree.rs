//! Depth-first walk over the document tree
//!
//! Shared by `list_tree` and the alias index rebuild. Entries are visited in
//! pre-order, siblings sorted by name, skipping hidden names and `assets`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::node::DocNode;
use super::{ASSETS_DIR, DOCUMENT_EXTENSION, HIDDEN_PREFIX};

/// A visited node
pub(crate) struct TreeEntry {
    /// Filesystem location (with `.txt` for documents)
    pub fs_path: PathBuf,

    pub node: DocNode,
}

/// Visit every directory and document below `root`
pub(crate) fn walk<F>(root: &Path, visit: &mut F) -> Result<()>
where
    F: FnMut(TreeEntry) -> Result<()>,
{
    let mut prefix = Vec::new();
    walk_dir(root, &mut prefix, visit)
}

fn walk_dir<F>(dir: &Path, prefix: &mut Vec<String>, visit: &mut F) -> Result<()>
where
    F: FnMut(TreeEntry) -> Result<()>,
{
    let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                tracing::warn!(name = ?raw, dir = %dir.display(), "skipping non UTF-8 entry");
                continue;
            }
        };
        if name.starts_with(HIDDEN_PREFIX) {
            continue;
        }

        let fs_path = entry.path();
        if fs_path.is_dir() {
            if name == ASSETS_DIR {
                continue;
            }
            prefix.push(name);
            visit(TreeEntry {
                fs_path: fs_path.clone(),
                node: DocNode::directory(prefix.as_slice()),
            })?;
            walk_dir(&fs_path, prefix, visit)?;
            prefix.pop();
        } else if let Some(stem) = document_stem(&fs_path) {
            prefix.push(stem);
            visit(TreeEntry {
                fs_path,
                node: DocNode::document(prefix.as_slice()),
            })?;
            prefix.pop();
        }
    }

    Ok(())
}

/// Stem of a regular `.txt` file whose stem is not hidden
fn document_stem(path: &Path) -> Option<String> {
    if !path.is_file() || path.extension()? != DOCUMENT_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || stem.starts_with(HIDDEN_PREFIX) {
        return None;
    }
    Some(stem.to_string())
}
