//! Calendar domain model.
//!
//! # Responsibility
//! - Define the event record shared by store, persistence and widget layers.
//! - Own the wire shape of timestamps and identifiers.
//!
//! # Invariants
//! - Every record is identified by an `EventId` that never changes.
//! - `end >= start` is trusted from the widget and not re-validated here.

pub mod event;
