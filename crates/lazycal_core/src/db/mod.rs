//! SQLite bootstrap for the durable slot store.
//!
//! Connections handed out here are ready for `SqliteSlotRepository`: the
//! `slots` table exists and `PRAGMA user_version` matches this build. Failures
//! surface as `SlotError` so callers deal with one storage error type.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
