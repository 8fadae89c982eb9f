//! Event collection persistence over one durable slot.
//!
//! # Responsibility
//! - Serialize the full event collection as a JSON array into one slot.
//! - Load it back at startup, failing soft on any problem.
//! - Act as a store observer so every store change is written through.
//!
//! # Invariants
//! - `save` always writes the whole collection; there are no partial writes.
//! - `load` never returns an error; unusable data is treated as absent.
//! - No schema version is stored; the format is the bare record array.

use crate::model::event::EventRecord;
use crate::repo::slot_repo::{SlotError, SlotRepository};
use crate::store::observer::{ObserverResult, StoreObserver};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key used when the host does not configure one.
pub const DEFAULT_SLOT_KEY: &str = "events";

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Write-path persistence failure.
#[derive(Debug)]
pub enum PersistenceError {
    Serialize(serde_json::Error),
    Slot(SlotError),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize events: {err}"),
            Self::Slot(err) => write!(f, "failed to write event slot: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Slot(err) => Some(err),
        }
    }
}

impl From<SlotError> for PersistenceError {
    fn from(value: SlotError) -> Self {
        Self::Slot(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Persistence adapter binding a slot repository to one slot key.
#[derive(Debug)]
pub struct EventPersistence<R: SlotRepository> {
    repo: R,
    key: String,
}

impl<R: SlotRepository> EventPersistence<R> {
    pub fn new(repo: R, key: impl Into<String>) -> Self {
        Self {
            repo,
            key: key.into(),
        }
    }

    /// Uses `DEFAULT_SLOT_KEY`.
    pub fn with_default_key(repo: R) -> Self {
        Self::new(repo, DEFAULT_SLOT_KEY)
    }

    /// Reads the stored collection.
    ///
    /// Missing, unreadable or malformed slots all yield an empty collection.
    pub fn load(&self) -> Vec<EventRecord> {
        let raw = match self.repo.read_slot(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(
                    "event=events_load module=persistence status=skip reason=absent key={}",
                    self.key
                );
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "event=events_load module=persistence status=error error_code=slot_read_failed key={} error={}",
                    self.key, err
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<EventRecord>>(&raw) {
            Ok(records) => {
                info!(
                    "event=events_load module=persistence status=ok key={} count={}",
                    self.key,
                    records.len()
                );
                records
            }
            Err(err) => {
                // serde_json messages can echo user content; log position only.
                warn!(
                    "event=events_load module=persistence status=error error_code=malformed_slot key={} line={} column={}",
                    self.key,
                    err.line(),
                    err.column()
                );
                Vec::new()
            }
        }
    }

    /// Overwrites the slot with the full `records` collection.
    ///
    /// # Errors
    /// - `PersistenceError::Serialize` when encoding fails.
    /// - `PersistenceError::Slot` when the backend rejects the write.
    pub fn save(&mut self, records: &[EventRecord]) -> PersistenceResult<()> {
        let payload = serde_json::to_string(records)?;
        if let Err(err) = self.repo.write_slot(&self.key, &payload) {
            error!(
                "event=events_save module=persistence status=error error_code=slot_write_failed key={} count={} error={}",
                self.key,
                records.len(),
                err
            );
            return Err(err.into());
        }

        debug!(
            "event=events_save module=persistence status=ok key={} count={} bytes={}",
            self.key,
            records.len(),
            payload.len()
        );
        Ok(())
    }
}

impl<R: SlotRepository> StoreObserver for EventPersistence<R> {
    fn on_change(&mut self, records: &[EventRecord]) -> ObserverResult {
        self.save(records)?;
        Ok(())
    }
}
