//! Node descriptors returned to callers

use serde::{Deserialize, Serialize};

/// One entry of the document tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocNode {
    /// Last path segment (file stem for documents)
    pub id: String,

    /// Logical path; directories end with `/`
    pub path: String,

    pub is_dir: bool,
}

impl DocNode {
    pub fn directory(segments: &[String]) -> Self {
        Self {
            id: segments.last().cloned().unwrap_or_default(),
            path: format!("{}/", segments.join("/")),
            is_dir: true,
        }
    }

    pub fn document(segments: &[String]) -> Self {
        Self {
            id: segments.last().cloned().unwrap_or_default(),
            path: segments.join("/"),
            is_dir: false,
        }
    }
}

/// A document with its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Always false; kept so the shape matches `DocNode`
    pub is_dir: bool,

    pub path: String,

    pub text: String,
}
