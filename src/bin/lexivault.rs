//! LexiVault CLI
//!
//! Inspect and edit blob logs and document trees without the web service.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lexivault::blob::LogScanner;
use lexivault::{AliasMaintenance, BlobLog, DocumentStore, Result, SyncStrategy, VaultError};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

/// LexiVault CLI
#[derive(Parser, Debug)]
#[command(name = "lexivault")]
#[command(about = "Offline tool for LexiVault blob logs and document trees")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operate on a blob log file
    Blob {
        /// Path of the log file
        file: PathBuf,

        /// fsync after every mutation
        #[arg(long)]
        sync: bool,

        #[command(subcommand)]
        action: BlobAction,
    },

    /// Operate on a document tree
    Doc {
        /// Root directory of the tree
        root: PathBuf,

        /// Move alias entries along with renamed/deleted documents
        #[arg(long)]
        strict_aliases: bool,

        #[command(subcommand)]
        action: DocAction,
    },
}

#[derive(Subcommand, Debug)]
enum BlobAction {
    /// Scan the log and print record statistics
    Stat,

    /// List live keys
    Keys,

    /// Print a value (raw bytes) or save it to a file
    Get {
        key: String,

        /// Write the value here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Store the contents of a file under a key
    Put {
        key: String,

        /// File holding the value
        input: PathBuf,
    },

    /// Tombstone a key
    Rm { key: String },
}

#[derive(Subcommand, Debug)]
enum DocAction {
    /// Print the whole tree
    Tree,

    /// Print a document
    Read { path: String },

    /// Create a document, or a directory when the path ends with '/'
    Create {
        path: String,

        #[arg(short, long, default_value = "")]
        alias: String,

        /// Document text
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the document text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Replace the text of a document
    Rewrite {
        path: String,

        #[arg(short, long, default_value = "")]
        alias: String,

        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Rename or move a node
    Mv { from: String, to: String },

    /// Move a node to the trash, or delete it from the trash
    Rm { path: String },

    /// Print the alias index
    Aliases,

    /// Print an attachment (raw bytes) or save it to a file
    Asset {
        path: String,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    // Logs go to stderr so stdout stays clean for data
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lexivault=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Blob { file, sync, action } => {
            let strategy = if sync {
                SyncStrategy::EveryWrite
            } else {
                SyncStrategy::Never
            };
            run_blob(file, strategy, action)
        }
        Commands::Doc {
            root,
            strict_aliases,
            action,
        } => {
            let mode = if strict_aliases {
                AliasMaintenance::Strict
            } else {
                AliasMaintenance::Lenient
            };
            run_doc(DocumentStore::open(root, mode)?, action)
        }
    }
}

fn run_blob(file: PathBuf, strategy: SyncStrategy, action: BlobAction) -> Result<()> {
    match action {
        BlobAction::Stat => {
            let scan = LogScanner::scan(&file)?;
            print_json(&serde_json::json!({
                "path": file.display().to_string(),
                "live_records": scan.live_records,
                "dead_records": scan.dead_records,
                "reclaimable_bytes": scan.reclaimable_bytes,
                "file_size": scan.file_size,
            }))
        }
        BlobAction::Keys => with_log(file, strategy, |log| {
            let mut keys: Vec<&str> = log.keys().collect();
            keys.sort_unstable();
            print_json(&keys)
        }),
        BlobAction::Get { key, out } => with_log(file, strategy, |log| {
            let value = log.read(&key)?.ok_or_else(|| VaultError::NotFound(key.clone()))?;
            write_bytes(&value, out)
        }),
        BlobAction::Put { key, input } => with_log(file, strategy, |log| {
            let value = fs::read(&input)?;
            let existed = log.has(&key)?;
            log.write(&key, &value)?;
            print_json(&serde_json::json!({ "key": key, "written": !existed }))
        }),
        BlobAction::Rm { key } => with_log(file, strategy, |log| {
            let removed = log.remove(&key)?;
            print_json(&serde_json::json!({ "key": key, "removed": removed }))
        }),
    }
}

fn with_log<F>(file: PathBuf, strategy: SyncStrategy, f: F) -> Result<()>
where
    F: FnOnce(&mut BlobLog) -> Result<()>,
{
    let mut log = BlobLog::new(file, strategy);
    log.open()?;
    f(&mut log)?;
    log.close()
}

fn run_doc(mut store: DocumentStore, action: DocAction) -> Result<()> {
    match action {
        DocAction::Tree => print_json(&store.list_tree()?),
        DocAction::Read { path } => print_json(&store.read(&path)?),
        DocAction::Create {
            path,
            alias,
            text,
            file,
        } => {
            let text = document_text(text, file)?;
            print_json(&store.create(&path, &alias, &text)?)
        }
        DocAction::Rewrite {
            path,
            alias,
            text,
            file,
        } => {
            let text = document_text(text, file)?;
            print_json(&store.rewrite(&path, &alias, &text)?)
        }
        DocAction::Mv { from, to } => print_json(&store.rename(&from, &to)?),
        DocAction::Rm { path } => print_json(&store.delete(&path)?),
        DocAction::Aliases => print_json(store.aliases()),
        DocAction::Asset { path, out } => write_bytes(&store.get_asset(&path)?, out),
    }
}

fn document_text(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(file)) => Ok(fs::read_to_string(file)?),
        (None, None) => Ok(String::new()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| VaultError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn write_bytes(bytes: &[u8], out: Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => fs::write(path, bytes)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
