//! # LexiVault
//!
//! Embedded storage engines behind a language-tutoring service:
//! - An append-only blob log for pronunciation audio
//! - A hierarchical text document store with aliases and a trash mirror
//! - A JSON dictionary for translations
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Web layer (external)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                          Vault                              │
//! │              (one lock per store, no globals)               │
//! └────────┬───────────────────┬───────────────────┬────────────┘
//!          │                   │                   │
//!          ▼                   ▼                   ▼
//!   ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//!   │   BlobLog   │     │ Dictionary  │     │DocumentStore│
//!   │ (append log)│     │   (JSON)    │     │ (.txt tree) │
//!   └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! Files are authoritative. The blob key index and the alias index live only
//! in memory and are rebuilt from disk on open.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod blob;
pub mod dictionary;
pub mod docs;
pub mod vault;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{VaultError, Result};
pub use config::{AliasMaintenance, Config, SyncStrategy};
pub use blob::BlobLog;
pub use dictionary::Dictionary;
pub use docs::{DocNode, Document, DocumentStore};
pub use vault::Vault;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LexiVault
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
