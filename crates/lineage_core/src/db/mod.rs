//! Member database bootstrap and schema migrations.
//!
//! # Responsibility
//! - Open a file-backed or in-memory members database.
//! - Bring its schema to the latest migration before handing it out.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection returned from [`open_db`] or [`open_db_in_memory`] is fully
//!   migrated; callers never see a half-built `members` table.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Where a members database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    File(PathBuf),
    Memory,
}

impl DbTarget {
    /// Short label used in `db_open` log lines.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

impl Display for DbTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => write!(f, ":memory:"),
        }
    }
}

#[derive(Debug)]
pub enum DbError {
    /// The database could not be opened or configured.
    Open {
        target: DbTarget,
        source: rusqlite::Error,
    },
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// One migration script failed; the whole batch was rolled back.
    MigrationFailed {
        version: u32,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "failed to open members database `{target}`: {source}")
            }
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "members schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MigrationFailed { version, source } => {
                write!(f, "members migration {version} failed: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::MigrationFailed { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
