//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate slot persistence for the event store.
//! - Translate widget intents into store mutations.

pub mod bridge;
pub mod persistence;
