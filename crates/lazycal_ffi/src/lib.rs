//! UI-facing bindings for LazyCal core.

pub mod api;
