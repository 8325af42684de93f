//! Logical document paths
//!
//! `a/b/` names a directory, `a/b` names the document stored as `a/b.txt`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, VaultError};

use super::{DOCUMENT_EXTENSION, TRASH_DIR};

/// What a logical path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    Document,
}

/// A validated logical path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocPath {
    segments: Vec<String>,
    kind: NodeKind,
}

impl DocPath {
    /// Parse a logical path
    ///
    /// Fails with `InvalidPath` if the path is empty or has an empty segment.
    /// Segments are not checked for `..`; keeping paths under the root is the
    /// caller's job.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(VaultError::invalid_path(raw, "Path is empty"));
        }

        let (body, kind) = match raw.strip_suffix('/') {
            Some(body) => (body, NodeKind::Directory),
            None => (raw, NodeKind::Document),
        };

        if body.is_empty() || body.split('/').any(str::is_empty) {
            return Err(VaultError::invalid_path(raw, "Path has an empty segment"));
        }

        Ok(Self {
            segments: body.split('/').map(str::to_string).collect(),
            kind,
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments of the enclosing directories
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// Last segment
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Segments joined by `/`, without the directory marker
    ///
    /// This is the alias index key for documents.
    pub fn key(&self) -> String {
        self.segments.join("/")
    }

    /// Same segments, other kind
    pub fn with_kind(&self, kind: NodeKind) -> Self {
        Self {
            segments: self.segments.clone(),
            kind,
        }
    }

    /// Where this node lives under `root`
    pub fn fs_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.parent_segments() {
            path.push(segment);
        }
        match self.kind {
            NodeKind::Directory => path.push(self.name()),
            NodeKind::Document => path.push(format!("{}.{}", self.name(), DOCUMENT_EXTENSION)),
        }
        path
    }

    /// True for nodes inside the trash mirror, including the trash root itself
    pub fn is_in_trash(&self) -> bool {
        self.segments[0] == TRASH_DIR && (self.segments.len() > 1 || self.is_dir())
    }

    /// True for `trash/`
    pub fn is_trash_root(&self) -> bool {
        self.is_dir() && self.segments.len() == 1 && self.segments[0] == TRASH_DIR
    }

    /// Mirrored location inside the trash
    pub fn to_trash(&self) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(TRASH_DIR.to_string());
        segments.extend(self.segments.iter().cloned());
        Self {
            segments,
            kind: self.kind,
        }
    }

    /// True if `self` is `other` or lies below it
    pub fn starts_with(&self, other: &DocPath) -> bool {
        self.segments.len() >= other.segments.len()
            && self.segments[..other.segments.len()] == other.segments[..]
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())?;
        if self.is_dir() {
            f.write_str("/")?;
        }
        Ok(())
    }
}
