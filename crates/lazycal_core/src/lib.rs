//! Core calendar state for LazyCal.
//! This crate owns the event collection, its persistence and the widget
//! intent contract; rendering stays with the host UI.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod store;
pub mod view;

pub use config::CoreConfig;
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::event::{EventId, EventIdError, EventRecord, EventTime, EventTimeParseError};
pub use repo::slot_repo::{
    MemorySlotRepository, SlotError, SlotRepository, SlotResult, SqliteSlotRepository,
};
pub use service::bridge::{
    BridgeError, BridgeResult, IntentOutcome, MutationBridge, TitleRequest, TitleRequestId,
    TitleResponse, WidgetIntent,
};
pub use service::persistence::{
    EventPersistence, PersistenceError, PersistenceResult, DEFAULT_SLOT_KEY,
};
pub use session::{CalendarSession, RenderModel, SessionError, SessionResult};
pub use store::observer::{ObserverError, ObserverResult, StoreObserver, SubscriptionId};
pub use store::{EventStore, StoreError, StoreResult};
pub use view::{ViewController, ViewMode, ViewModeParseError};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
