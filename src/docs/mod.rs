//! Document Store Module
//!
//! Text documents addressed by slash-delimited logical paths.
//!
//! ## Responsibilities
//! - Map logical paths onto `.txt` files and directories under one root
//! - List the tree, read, create, rewrite, rename and delete nodes
//! - Soft-delete into a trash mirror, hard-delete from it
//! - Keep an alias index derived from document headers
//!
//! ## Filesystem Layout
//! ```text
//! {root}/
//!   ├── grammar/
//!   │   ├── verbs.txt        → "grammar/verbs"
//!   │   └── assets/          (attachments, never listed)
//!   ├── nouns.txt            → "nouns"
//!   └── trash/
//!       └── grammar/
//!           └── old.txt      → "trash/grammar/old"
//! ```
//!
//! Paths are validated for shape only. Callers must reject `..` segments
//! before they reach the store.

mod alias;
mod node;
mod path;
mod store;
mod tree;

pub use alias::{parse_alias, read_alias, AliasIndex, ALIAS_HEADER};
pub use node::{DocNode, Document};
pub use path::{DocPath, NodeKind};
pub use store::DocumentStore;

/// Extension of document files
pub const DOCUMENT_EXTENSION: &str = "txt";

/// Name of the trash directory under the root
pub const TRASH_DIR: &str = "trash";

/// Directories with this name hold attachments and are not part of the tree
pub const ASSETS_DIR: &str = "assets";

/// Entries starting with this are skipped
pub const HIDDEN_PREFIX: &str = ".";
