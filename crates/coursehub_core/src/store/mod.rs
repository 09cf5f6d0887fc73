//! Durable key-value substrate.
//!
//! # Responsibility
//! - Provide namespaced, synchronous `get/set/remove` over opaque bytes.
//! - Know nothing about entities; collections are layered on top.
//!
//! # Invariants
//! - Each `set` is atomic for its own key only, never across keys.
//! - A value written by `set` is visible to the next `get` on the same store.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Namespaced byte store injected into the data layer.
pub trait DurableStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;

    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Failures of the durable substrate or of the bytes stored in it.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Stored bytes under `key` could not be decoded.
    Corrupted { key: String, message: String },
    /// Stored collection was written by a newer binary.
    UnsupportedSchemaVersion {
        key: String,
        found: u32,
        supported: u32,
    },
    Encode(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Corrupted { key, message } => {
                write!(f, "stored collection `{key}` is corrupted: {message}")
            }
            Self::UnsupportedSchemaVersion {
                key,
                found,
                supported,
            } => write!(
                f,
                "stored collection `{key}` has schema version {found}, newer than supported {supported}"
            ),
            Self::Encode(message) => write!(f, "failed to encode collection: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
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
