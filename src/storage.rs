//! Local persistence for build records.
//!
//! All builds share one `SQLite` database under the storage root:
//!
//! ```text
//! <root>/
//!   phaseboard.sqlite   # build + phase tables
//! ```
//!
//! Phases are stored as reported. Normalization happens on read.

mod build;

use std::{fs, io, path::PathBuf};

use rusqlite::Connection;
use tracing::debug;

const DATABASE_FILE: &str = "phaseboard.sqlite";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS build (
        id          TEXT PRIMARY KEY,
        project     TEXT,
        recorded_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS phase (
        build_id         TEXT NOT NULL,
        seq              INTEGER NOT NULL,
        phase_type       TEXT NOT NULL,
        phase_status     TEXT,
        start_time       TEXT NOT NULL,
        duration_seconds INTEGER,
        PRIMARY KEY (build_id, seq)
    );
";

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("build not found: {0}")]
    BuildNotFound(String),

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("value out of range for storage: {0}")]
    OutOfRange(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Local `SQLite` storage for build records.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory and the database schema are created if missing.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let storage = Self { root };
        storage.open()?;
        Ok(storage)
    }

    /// Returns the default storage root: `~/.phaseboard/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".phaseboard"))
    }

    /// Opens a connection, creating tables on first use.
    fn open(&self) -> Result<Connection> {
        let path = self.root.join(DATABASE_FILE);
        debug!(path = %path.display(), "opening database");
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }
}
