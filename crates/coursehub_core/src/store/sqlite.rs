//! SQLite-backed durable store.
//!
//! # Invariants
//! - Entries are scoped by `namespace`; two stores with different
//!   namespaces never observe each other's keys.
//! - `set` is a single-row UPSERT, atomic for that key only.

use super::{DurableStore, StoreResult};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteStore {
    conn: Connection,
    namespace: String,
}

impl SqliteStore {
    /// Opens (or creates) a database file and migrates it.
    pub fn open(path: impl AsRef<Path>, namespace: impl Into<String>) -> StoreResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
            namespace: namespace.into(),
        })
    }

    pub fn open_in_memory(namespace: impl Into<String>) -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
            namespace: namespace.into(),
        })
    }

    /// Wraps an existing connection that must already be migrated.
    pub fn from_connection(conn: Connection, namespace: impl Into<String>) -> StoreResult<Self> {
        let actual_version = current_user_version(&conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(DbError::Uninitialized {
                expected_version,
                actual_version,
            }
            .into());
        }
        Ok(Self {
            conn,
            namespace: namespace.into(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl DurableStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE namespace = ?1 AND key = ?2;",
                params![self.namespace, key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (namespace, key, value, updated_at)
             VALUES (?1, ?2, ?3, strftime('%s', 'now') * 1000)
             ON CONFLICT (namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.namespace, key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn.execute(
            "DELETE FROM kv_entries WHERE namespace = ?1 AND key = ?2;",
            params![self.namespace, key],
        )?;
        Ok(())
    }
}
