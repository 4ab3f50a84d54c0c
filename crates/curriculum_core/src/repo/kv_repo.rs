//! Key-value repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist opaque JSON documents under stable string keys.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `put` replaces any previous value for the key.
//! - Values are stored as given; callers own (de)serialization.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type KvResult<T> = Result<T, KvRepoError>;

#[derive(Debug)]
pub enum KvRepoError {
    Db(DbError),
    /// Connection schema is not the one this binary migrates to.
    InvalidData(String),
}

impl Display for KvRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid key-value store: {message}"),
        }
    }
}

impl Error for KvRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for KvRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for string documents keyed by name.
pub trait KvRepository {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> KvResult<()>;
    /// Returns whether a value existed.
    fn delete(&self, key: &str) -> KvResult<bool>;
}

impl<R: KvRepository + ?Sized> KvRepository for &R {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> KvResult<bool> {
        (**self).delete(key)
    }
}

/// SQLite-backed key-value repository over `kv_entries`.
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    /// Wraps a connection opened through [`crate::db::open_db`].
    ///
    /// Rejects connections whose schema was not migrated to the latest
    /// version.
    pub fn try_new(conn: &'conn Connection) -> KvResult<Self> {
        let version = schema_version(conn)?;
        if version != latest_version() {
            return Err(KvRepoError::InvalidData(format!(
                "schema version {version} does not match expected {}",
                latest_version()
            )));
        }
        Ok(Self { conn })
    }
}

impl KvRepository for SqliteKvRepository<'_> {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> KvResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }
}
