//! Document Store
//!
//! Maps logical paths onto a directory of `.txt` files and keeps the alias
//! index in step with create/rewrite.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::AliasMaintenance;
use crate::error::{Result, VaultError};

use super::alias::AliasIndex;
use super::node::{DocNode, Document};
use super::path::{DocPath, NodeKind};
use super::tree::{self, TreeEntry};
use super::{DOCUMENT_EXTENSION, TRASH_DIR};

/// Hierarchical text document store with a trash mirror
///
/// ## Concurrency
/// Reads take `&self`, mutations take `&mut self`. Two processes working on
/// the same root are not coordinated.
pub struct DocumentStore {
    /// Root of the tree
    root: PathBuf,

    /// `{root}/trash`
    trash: PathBuf,

    /// Derived from the files, rebuilt on open
    aliases: AliasIndex,

    alias_maintenance: AliasMaintenance,
}

impl DocumentStore {
    /// Open (or create) the store rooted at `root`
    ///
    /// Creates the root and trash directories, then scans every document for
    /// its alias header.
    pub fn open(root: impl Into<PathBuf>, alias_maintenance: AliasMaintenance) -> Result<Self> {
        let root = root.into();
        let trash = root.join(TRASH_DIR);
        fs::create_dir_all(&trash)?;

        let aliases = AliasIndex::build(&root)?;
        tracing::info!(
            root = %root.display(),
            aliases = aliases.len(),
            "document store opened"
        );

        Ok(Self {
            root,
            trash,
            aliases,
            alias_maintenance,
        })
    }

    /// Every directory and document, depth-first, siblings sorted by name
    pub fn list_tree(&self) -> Result<Vec<DocNode>> {
        let mut nodes = Vec::new();
        tree::walk(&self.root, &mut |entry: TreeEntry| {
            nodes.push(entry.node);
            Ok(())
        })?;
        Ok(nodes)
    }

    /// Read a document
    pub fn read(&self, path: &str) -> Result<Document> {
        let doc = DocPath::parse(path)?;
        if doc.is_dir() {
            return Err(VaultError::NotFound(doc.to_string()));
        }

        let text = fs::read_to_string(doc.fs_path(&self.root))
            .map_err(|e| not_found_or_io(e, &doc))?;

        Ok(Document {
            is_dir: false,
            path: doc.key(),
            text,
        })
    }

    /// Create a directory (`path` ends with `/`) or a document
    ///
    /// Returns a descriptor for every directory that had to be created, in
    /// creation order, followed by the new document. The alias index entry is
    /// set to `alias` whether or not `text` carries an alias header.
    pub fn create(&mut self, path: &str, alias: &str, text: &str) -> Result<Vec<DocNode>> {
        let doc = DocPath::parse(path)?;
        if self.is_occupied(&doc) {
            return Err(VaultError::AlreadyExists(doc.to_string()));
        }

        match doc.kind() {
            NodeKind::Directory => self.create_dirs(doc.segments()),
            NodeKind::Document => {
                let mut created = self.create_dirs(doc.parent_segments())?;
                fs::write(doc.fs_path(&self.root), text)?;
                tracing::debug!(path = %doc, "document created");

                self.aliases.set(doc.key(), alias);
                created.push(DocNode::document(doc.segments()));
                Ok(created)
            }
        }
    }

    /// Replace the text of an existing document and set its alias
    pub fn rewrite(&mut self, path: &str, alias: &str, text: &str) -> Result<Vec<DocNode>> {
        let doc = DocPath::parse(path)?;
        if doc.is_dir() {
            return Err(VaultError::InvalidFile {
                path: doc.to_string(),
                details: "Directory can not be rewritten! Expected a file path without slash at the end."
                    .to_string(),
            });
        }

        let fs_path = doc.fs_path(&self.root);
        if !fs_path.is_file() {
            return Err(VaultError::NotFound(doc.to_string()));
        }

        fs::write(&fs_path, text)?;
        self.aliases.set(doc.key(), alias);
        tracing::debug!(path = %doc, "document rewritten");
        Ok(Vec::new())
    }

    /// Move a node to a new logical path
    ///
    /// Both paths must name the same kind of node. Returns descriptors for
    /// destination ancestors created on the way.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<Vec<DocNode>> {
        let from = DocPath::parse(from)?;
        let to = DocPath::parse(to)?;

        if from.kind() != to.kind() {
            return Err(VaultError::invalid_path(
                format!("{}->{}", from, to),
                "File can not be renamed to directory and vice versa.",
            ));
        }

        let from_fs = from.fs_path(&self.root);
        if !self.node_exists(&from) {
            return Err(VaultError::NotFound(from.to_string()));
        }
        if self.is_occupied(&to) {
            return Err(VaultError::AlreadyExists(to.to_string()));
        }
        if from.is_dir() && to.starts_with(&from) {
            return Err(VaultError::invalid_path(
                format!("{}->{}", from, to),
                "Directory can not be moved into itself.",
            ));
        }

        let created = self.create_dirs(to.parent_segments())?;
        fs::rename(&from_fs, to.fs_path(&self.root))?;
        tracing::info!(from = %from, to = %to, "node renamed");

        if self.alias_maintenance == AliasMaintenance::Strict {
            self.move_aliases(&from, &to);
        }
        Ok(created)
    }

    /// Move a node to the trash, or remove it for good if it is already there
    ///
    /// For a live node the result lists the trash ancestors that had to be
    /// created, then the node at its new place in the trash. Deleting
    /// `trash/` empties the trash.
    pub fn delete(&mut self, path: &str) -> Result<Vec<DocNode>> {
        let doc = DocPath::parse(path)?;
        let fs_path = doc.fs_path(&self.root);
        if !self.node_exists(&doc) {
            return Err(VaultError::NotFound(doc.to_string()));
        }

        if doc.is_in_trash() {
            match doc.kind() {
                NodeKind::Directory => fs::remove_dir_all(&fs_path)?,
                NodeKind::Document => fs::remove_file(&fs_path)?,
            }
            if doc.is_trash_root() {
                fs::create_dir_all(&self.trash)?;
            }
            tracing::info!(path = %doc, "node deleted permanently");

            if self.alias_maintenance == AliasMaintenance::Strict {
                match doc.kind() {
                    NodeKind::Directory => self.aliases.remove_prefix(&doc.key()),
                    NodeKind::Document => {
                        self.aliases.remove(&doc.key());
                    }
                }
            }
            return Ok(Vec::new());
        }

        let target = doc.to_trash();
        let target_fs = target.fs_path(&self.root);
        let collides = match target.kind() {
            NodeKind::Directory => self.is_occupied(&target),
            // an older trashed copy of the same document is replaced
            NodeKind::Document => self.twin_exists(&target),
        };
        if collides {
            return Err(VaultError::AlreadyExists(target.to_string()));
        }

        let mut created = self.create_dirs(target.parent_segments())?;
        fs::rename(&fs_path, &target_fs)?;
        tracing::info!(path = %doc, trash = %target, "node moved to trash");

        if self.alias_maintenance == AliasMaintenance::Strict {
            self.move_aliases(&doc, &target);
        }
        created.push(match target.kind() {
            NodeKind::Directory => DocNode::directory(target.segments()),
            NodeKind::Document => DocNode::document(target.segments()),
        });
        Ok(created)
    }

    /// Raw bytes of a file below the root (images and other attachments)
    ///
    /// Anything that is not an existing file is `NotFound`. Absolute paths
    /// are rejected since joining them would leave the root.
    pub fn get_asset(&self, path: &str) -> Result<Vec<u8>> {
        if path.starts_with('/') {
            return Err(VaultError::invalid_path(path, "Asset path must be relative to the root"));
        }

        let fs_path = self.root.join(path);
        if !fs_path.is_file() {
            return Err(VaultError::NotFound(path.to_string()));
        }
        Ok(fs::read(fs_path)?)
    }

    /// Rebuild the alias index from the files
    pub fn rebuild_aliases(&mut self) -> Result<()> {
        self.aliases = AliasIndex::build(&self.root)?;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The whole alias index
    pub fn aliases(&self) -> &AliasIndex {
        &self.aliases
    }

    /// Alias of the document at `path`
    pub fn alias(&self, path: &str) -> Option<&str> {
        self.aliases.get(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn trash_root(&self) -> &Path {
        &self.trash
    }

    pub fn alias_maintenance(&self) -> AliasMaintenance {
        self.alias_maintenance
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Create each missing directory along `segments`, returning the new ones
    fn create_dirs(&self, segments: &[String]) -> Result<Vec<DocNode>> {
        let mut created = Vec::new();
        let mut current = self.root.clone();

        for (i, name) in segments.iter().enumerate() {
            current.push(name);
            if current.is_dir() {
                continue;
            }

            let twin = current.with_file_name(format!("{}.{}", name, DOCUMENT_EXTENSION));
            if twin.is_file() {
                return Err(VaultError::AlreadyExists(segments[..=i].join("/")));
            }

            match fs::create_dir(&current) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::AlreadyExists && current.is_dir() => continue,
                Err(e) => return Err(e.into()),
            }
            tracing::debug!(dir = %current.display(), "directory created");
            created.push(DocNode::directory(&segments[..=i]));
        }

        Ok(created)
    }

    /// True if the node itself exists with the right kind
    fn node_exists(&self, doc: &DocPath) -> bool {
        let fs_path = doc.fs_path(&self.root);
        match doc.kind() {
            NodeKind::Directory => fs_path.is_dir(),
            NodeKind::Document => fs_path.is_file(),
        }
    }

    /// True if a node of the other kind holds the same logical path
    fn twin_exists(&self, doc: &DocPath) -> bool {
        let twin = match doc.kind() {
            NodeKind::Directory => doc.with_kind(NodeKind::Document),
            NodeKind::Document => doc.with_kind(NodeKind::Directory),
        };
        self.node_exists(&twin)
    }

    /// A logical path is occupied by a node of either kind
    fn is_occupied(&self, doc: &DocPath) -> bool {
        doc.fs_path(&self.root).exists() || self.twin_exists(doc)
    }

    fn move_aliases(&mut self, from: &DocPath, to: &DocPath) {
        match from.kind() {
            NodeKind::Directory => self.aliases.move_prefix(&from.key(), &to.key()),
            NodeKind::Document => self.aliases.move_entry(&from.key(), &to.key()),
        }
        tracing::debug!(from = %from, to = %to, "aliases moved");
    }
}

fn not_found_or_io(e: std::io::Error, doc: &DocPath) -> VaultError {
    if e.kind() == ErrorKind::NotFound {
        VaultError::NotFound(doc.to_string())
    } else {
        VaultError::Io(e)
    }
}
