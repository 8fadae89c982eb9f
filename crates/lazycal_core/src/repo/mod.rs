//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable slot contract used by event persistence.
//! - Isolate SQLite query details from store/session orchestration.

pub mod slot_repo;
