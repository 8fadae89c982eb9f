//! Explicitly owned calendar session state.
//!
//! # Responsibility
//! - Own the event store, view controller and mutation bridge of one
//!   calendar instance.
//! - Run the startup sequence: load slot, install records, then start
//!   write-through persistence.
//! - Produce the render input handed to the calendar widget.
//!
//! # Invariants
//! - `open*` returns only after stored events are installed, so the first
//!   render never sees an empty calendar by accident.
//! - Startup does not rewrite the slot it just loaded.
//! - Every later store change is persisted before the triggering call returns.

use crate::model::event::EventRecord;
use crate::repo::slot_repo::{SlotError, SlotRepository, SqliteSlotRepository};
use crate::service::bridge::{
    BridgeResult, IntentOutcome, MutationBridge, TitleRequest, TitleResponse, WidgetIntent,
};
use crate::service::persistence::EventPersistence;
use crate::store::observer::{StoreObserver, SubscriptionId};
use crate::store::{EventStore, StoreError};
use crate::view::{ViewController, ViewMode};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type SessionResult<T> = Result<T, SessionError>;

/// Session startup failure.
#[derive(Debug)]
pub enum SessionError {
    Slot(SlotError),
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slot(err) => write!(f, "failed to open event storage: {err}"),
            Self::Store(err) => write!(f, "failed to install stored events: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Slot(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<SlotError> for SessionError {
    fn from(value: SlotError) -> Self {
        Self::Slot(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Render input for the calendar widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderModel {
    pub records: Vec<EventRecord>,
    pub active_view: ViewMode,
    pub editable: bool,
    pub droppable: bool,
}

/// One calendar instance.
#[derive(Debug, Default)]
pub struct CalendarSession {
    store: EventStore,
    views: ViewController,
    bridge: MutationBridge,
    persistence: Option<SubscriptionId>,
}

impl CalendarSession {
    /// Loads stored events through `persistence` and keeps it subscribed.
    pub fn open<R>(persistence: EventPersistence<R>) -> SessionResult<Self>
    where
        R: SlotRepository + 'static,
    {
        let mut session = Self::default();
        let records = persistence.load();
        let installed = session.store.replace_all(records)?;
        session.persistence = Some(session.store.subscribe(persistence));

        info!("event=session_open module=session status=ok count={installed}");
        Ok(session)
    }

    /// Opens the SQLite database at `path` and uses slot `key`.
    pub fn open_sqlite(path: impl AsRef<Path>, key: &str) -> SessionResult<Self> {
        let repo = SqliteSlotRepository::open(path)?;
        Self::open(EventPersistence::new(repo, key))
    }

    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn snapshot(&self) -> &[EventRecord] {
        self.store.snapshot()
    }

    /// Adds a change observer (e.g. a renderer) after persistence.
    pub fn subscribe(&mut self, observer: impl StoreObserver + 'static) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    /// Removes an observer added through `subscribe`.
    ///
    /// The persistence subscription cannot be removed this way.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if self.persistence == Some(id) {
            return false;
        }
        self.store.unsubscribe(id)
    }

    pub fn handle_intent(&mut self, intent: WidgetIntent) -> BridgeResult<IntentOutcome> {
        self.bridge.handle(&mut self.store, intent)
    }

    pub fn fulfill_title(&mut self, response: TitleResponse) -> BridgeResult<IntentOutcome> {
        self.bridge.fulfill_title(&mut self.store, response)
    }

    pub fn pending_title_requests(&self) -> Vec<TitleRequest> {
        self.bridge.pending_requests().cloned().collect()
    }

    /// Drops every unanswered title request. Returns how many were dropped.
    pub fn cancel_title_requests(&mut self) -> usize {
        self.bridge.cancel_all()
    }

    pub fn set_view(&mut self, mode: ViewMode) {
        self.views.set_view(mode);
    }

    pub fn reset_view(&mut self) {
        self.views.reset();
    }

    pub fn active_view(&self) -> ViewMode {
        self.views.active_view()
    }

    pub fn render_model(&self) -> RenderModel {
        RenderModel {
            records: self.store.snapshot().to_vec(),
            active_view: self.views.active_view(),
            editable: true,
            droppable: true,
        }
    }
}
