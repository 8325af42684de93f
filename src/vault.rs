//! Vault Module
//!
//! Composition root that owns every store of a process.
//!
//! ## Responsibilities
//! - Create the data directory layout
//! - Open the configured blob logs, dictionaries and the document store
//! - Hand out locked access to each of them
//! - Close everything on shutdown

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::blob::BlobLog;
use crate::config::Config;
use crate::dictionary::Dictionary;
use crate::docs::DocumentStore;
use crate::error::{Result, VaultError};

/// Every store of one data directory
///
/// ## Concurrency Model
///
/// The stores themselves are single-writer and do no locking. The vault puts
/// one lock around each resource:
///
/// - **Blob logs**: `Mutex` per log. Reads seek the shared file handle, so
///   they are exclusive too.
/// - **Dictionaries**: `Mutex` per dictionary.
/// - **Documents**: `RwLock`. `list_tree`/`read`/`get_asset` share,
///   `create`/`rewrite`/`rename`/`delete` are exclusive.
///
/// Stores never lock each other, so there is no lock ordering to respect.
pub struct Vault {
    /// Vault configuration
    config: Config,

    /// Blob logs by name
    blob_logs: HashMap<String, Mutex<BlobLog>>,

    /// Dictionaries by name
    dictionaries: HashMap<String, Mutex<Dictionary>>,

    /// The document tree
    documents: RwLock<DocumentStore>,
}

impl Vault {
    /// Open every store named in `config`
    ///
    /// A corrupt blob log or dictionary aborts the whole open.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        // Step 1: Create data directory
        fs::create_dir_all(&config.data_dir)?;

        // Step 2: Open blob logs (full scan each)
        let mut blob_logs = HashMap::with_capacity(config.blob_logs.len());
        for name in &config.blob_logs {
            let mut log = BlobLog::new(config.blob_log_path(name), config.sync_strategy);
            log.open()?;
            blob_logs.insert(name.clone(), Mutex::new(log));
        }

        // Step 3: Load dictionaries
        let mut dictionaries = HashMap::with_capacity(config.dictionaries.len());
        for name in &config.dictionaries {
            let dictionary = Dictionary::open(config.dictionary_path(name))?;
            dictionaries.insert(name.clone(), Mutex::new(dictionary));
        }

        // Step 4: Open document store (alias scan)
        let documents = DocumentStore::open(config.document_root(), config.alias_maintenance)?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            blob_logs = blob_logs.len(),
            dictionaries = dictionaries.len(),
            "vault opened"
        );

        Ok(Self {
            config,
            blob_logs,
            dictionaries,
            documents: RwLock::new(documents),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Lock the blob log called `name`
    pub fn blob_log(&self, name: &str) -> Result<MutexGuard<'_, BlobLog>> {
        self.blob_logs
            .get(name)
            .map(|store| store.lock())
            .ok_or_else(|| VaultError::UnknownStore(name.to_string()))
    }

    /// Lock the dictionary called `name`
    pub fn dictionary(&self, name: &str) -> Result<MutexGuard<'_, Dictionary>> {
        self.dictionaries
            .get(name)
            .map(|store| store.lock())
            .ok_or_else(|| VaultError::UnknownStore(name.to_string()))
    }

    /// The document store behind its lock
    pub fn documents(&self) -> &RwLock<DocumentStore> {
        &self.documents
    }

    /// Close blob logs and persist dictionaries
    ///
    /// Every store is attempted; the first error is returned.
    pub fn close(self) -> Result<()> {
        let mut first_error = None;

        for (name, log) in &self.blob_logs {
            if let Err(e) = log.lock().close() {
                tracing::error!(store = %name, error = %e, "failed to close blob log");
                first_error.get_or_insert(e);
            }
        }

        for (name, dictionary) in &self.dictionaries {
            if let Err(e) = dictionary.lock().store() {
                tracing::error!(store = %name, error = %e, "failed to store dictionary");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                tracing::info!(data_dir = %self.config.data_dir.display(), "vault closed");
                Ok(())
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Names of the open blob logs, sorted
    pub fn blob_log_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.blob_logs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names of the loaded dictionaries, sorted
    pub fn dictionary_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dictionaries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
