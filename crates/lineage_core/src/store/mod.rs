//! Person store: repository contract, SQLite implementation and snapshots.
//!
//! # Responsibility
//! - Persist full person records and their soft-delete flag.
//! - Import/export the whole collection as a JSON array snapshot.
//!
//! # Invariants
//! - Writes validate records before touching SQL.
//! - Listing order is insertion order, so callers see a stable collection.
//! - Reads reject corrupted rows instead of masking them.

pub mod person_repo;
pub mod snapshot;

use crate::db::DbError;
use crate::model::person::{PersonId, PersonValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error for persistence, validation and snapshot decoding.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Validation(PersonValidationError),
    NotFound(PersonId),
    DuplicateId(PersonId),
    /// Persisted row cannot be converted back to a valid person.
    InvalidData(String),
    /// JSON encoding/decoding of records or snapshots failed.
    Json(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::DuplicateId(id) => write!(f, "duplicate person id: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
            Self::Json(err) => write!(f, "invalid person json: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateId(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<PersonValidationError> for StoreError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
