//! Configuration for LexiVault
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, VaultError};

/// Main configuration for a LexiVault instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── pron/{name}.bin   (blob logs)
    ///     ├── json/{name}.json  (dictionaries)
    ///     └── index/            (document tree, with index/trash/)
    pub data_dir: PathBuf,

    /// Names of the blob logs to open
    pub blob_logs: Vec<String>,

    /// Names of the JSON dictionaries to load
    pub dictionaries: Vec<String>,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// When to fsync blob log mutations
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Document Store Configuration
    // -------------------------------------------------------------------------
    /// Whether rename/delete keep the alias index in step with the tree
    pub alias_maintenance: AliasMaintenance,
}

/// Blob log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStrategy {
    /// Leave flushing to the OS
    #[default]
    Never,

    /// `sync_data` after every append and every tombstone flip
    EveryWrite,
}

/// How the alias index reacts to rename and delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AliasMaintenance {
    /// Entries stay under the old path after rename/delete.
    /// They are dropped on the next rebuild.
    #[default]
    Lenient,

    /// Entries follow the node on rename/move to trash and are dropped on
    /// permanent deletion
    Strict,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./lexivault_data"),
            blob_logs: vec!["en".to_string(), "de".to_string()],
            dictionaries: vec!["en_ru".to_string()],
            sync_strategy: SyncStrategy::Never,
            alias_maintenance: AliasMaintenance::Lenient,
        }
    }
}

impl Config {
    const BLOB_DIR: &'static str = "pron";
    const DICTIONARY_DIR: &'static str = "json";
    const DOCUMENT_DIR: &'static str = "index";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the blob log with the given name
    pub fn blob_log_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(Self::BLOB_DIR).join(format!("{}.bin", name))
    }

    /// Path of the dictionary with the given name
    pub fn dictionary_path(&self, name: &str) -> PathBuf {
        self.data_dir
            .join(Self::DICTIONARY_DIR)
            .join(format!("{}.json", name))
    }

    /// Root directory of the document tree
    pub fn document_root(&self) -> PathBuf {
        self.data_dir.join(Self::DOCUMENT_DIR)
    }

    /// Check store names before anything touches the filesystem
    pub fn validate(&self) -> Result<()> {
        for name in self.blob_logs.iter().chain(&self.dictionaries) {
            if name.is_empty()
                || name.starts_with('.')
                || name.contains(|c| c == '/' || c == '\\')
            {
                return Err(VaultError::Config(format!(
                    "store name \"{}\" must be a plain file name",
                    name
                )));
            }
        }

        for (i, name) in self.blob_logs.iter().enumerate() {
            if self.blob_logs[..i].contains(name) {
                return Err(VaultError::Config(format!("blob log \"{}\" is listed twice", name)));
            }
        }

        for (i, name) in self.dictionaries.iter().enumerate() {
            if self.dictionaries[..i].contains(name) {
                return Err(VaultError::Config(format!(
                    "dictionary \"{}\" is listed twice",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Replace the list of blob logs
    pub fn blob_logs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.blob_logs = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the list of dictionaries
    pub fn dictionaries<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.dictionaries = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the blob log sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set how the alias index follows rename/delete
    pub fn alias_maintenance(mut self, mode: AliasMaintenance) -> Self {
        self.config.alias_maintenance = mode;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
