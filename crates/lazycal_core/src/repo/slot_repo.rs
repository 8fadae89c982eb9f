//! Durable key-value slot contracts and implementations.
//!
//! # Responsibility
//! - Read and overwrite one named text slot at a time.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `write_slot` replaces the previous value of the key entirely.
//! - `read_slot` of a never-written key returns `Ok(None)`.

use crate::db::open_db;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::rc::Rc;

pub type SlotResult<T> = Result<T, SlotError>;

/// Slot storage failure, covering both backends and the SQLite bootstrap.
#[derive(Debug)]
pub enum SlotError {
    Sqlite(rusqlite::Error),
    /// The database file was written by a newer LazyCal; it is left untouched.
    SchemaTooNew { found: u32, supported: u32 },
    /// Writing would exceed the backend's size limit.
    QuotaExceeded { needed: usize, quota: usize },
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "slot storage error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "slot storage schema v{found} is newer than this build (v{supported})"
            ),
            Self::QuotaExceeded { needed, quota } => {
                write!(f, "slot quota exceeded: needed {needed} bytes, quota {quota}")
            }
        }
    }
}

impl Error for SlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for SlotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Repository interface for named text slots.
pub trait SlotRepository {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>>;
    fn write_slot(&mut self, key: &str, value: &str) -> SlotResult<()>;
}

/// SQLite-backed slot repository.
///
/// Owns its connection so it can live inside a store observer.
#[derive(Debug)]
pub struct SqliteSlotRepository {
    conn: Connection,
}

impl SqliteSlotRepository {
    /// Wraps a connection that already went through `db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens the database file at `path` (creating it when missing).
    pub fn open(path: impl AsRef<Path>) -> SlotResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SlotRepository for SqliteSlotRepository {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write_slot(&mut self, key: &str, value: &str) -> SlotResult<()> {
        self.conn.execute(
            "INSERT INTO slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-process slot repository.
///
/// Clones share the same slots, so a test can keep a handle after moving
/// one into a session.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotRepository {
    slots: Rc<RefCell<BTreeMap<String, String>>>,
    quota: Option<usize>,
}

impl MemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits every stored value to `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Returns the raw text stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    /// Stores `value` without any size check.
    pub fn set_raw(&self, key: &str, value: impl Into<String>) {
        self.slots.borrow_mut().insert(key.to_string(), value.into());
    }
}

impl SlotRepository for MemorySlotRepository {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>> {
        Ok(self.raw(key))
    }

    fn write_slot(&mut self, key: &str, value: &str) -> SlotResult<()> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(SlotError::QuotaExceeded {
                    needed: value.len(),
                    quota,
                });
            }
        }
        self.set_raw(key, value);
        Ok(())
    }
}
