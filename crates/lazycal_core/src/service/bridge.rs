//! Widget intent translation.
//!
//! # Responsibility
//! - Map calendar widget callbacks onto `EventStore` operations.
//! - Run the date-click create flow as a title request/response exchange, so
//!   no call ever blocks waiting for user input.
//!
//! # Invariants
//! - Widget-supplied records are stored verbatim (drag-create, move, resize).
//! - A cancelled or empty title never creates a record; any other title is
//!   stored exactly as typed.
//! - Each title request is fulfilled at most once.

use crate::model::event::{EventId, EventRecord, EventTime};
use crate::store::{EventStore, StoreError};
use log::{debug, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug)]
pub enum BridgeError {
    /// No pending title request carries this id.
    UnknownRequest(TitleRequestId),
    Store(StoreError),
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRequest(id) => write!(f, "no pending title request: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownRequest(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for BridgeError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Identifier of one outstanding title request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TitleRequestId(pub u64);

impl Display for TitleRequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback emitted by the calendar widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetIntent {
    /// An empty cell was clicked.
    DateClick { date: EventTime, all_day: bool },
    /// The widget materialized a new event (e.g. drag-create).
    EventAdded(EventRecord),
    /// An existing event was moved or resized.
    EventChanged(EventRecord),
    /// An event was removed from the calendar.
    EventRemoved(EventId),
}

/// Ask the UI for a title for a new event on `date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRequest {
    pub request_id: TitleRequestId,
    pub date: EventTime,
    pub all_day: bool,
}

/// UI answer to a `TitleRequest`. `None` means the user cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleResponse {
    pub request_id: TitleRequestId,
    pub title: Option<String>,
}

/// What one intent (or title response) did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    /// Nothing changed yet; the UI must answer this request.
    TitleRequested(TitleRequest),
    Added(EventId),
    Updated { id: EventId, matched: bool },
    Removed { id: EventId, matched: bool },
    /// The title request was cancelled or answered with an empty title.
    Cancelled(TitleRequestId),
}

/// Translates widget intents into store operations.
#[derive(Debug, Default)]
pub struct MutationBridge {
    pending: BTreeMap<TitleRequestId, TitleRequest>,
    next_request: u64,
}

impl MutationBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one widget intent to `store`.
    ///
    /// `DateClick` only opens a title request; the record is created by
    /// `fulfill_title`.
    pub fn handle(
        &mut self,
        store: &mut EventStore,
        intent: WidgetIntent,
    ) -> BridgeResult<IntentOutcome> {
        match intent {
            WidgetIntent::DateClick { date, all_day } => {
                let request = self.open_request(date, all_day);
                Ok(IntentOutcome::TitleRequested(request))
            }
            WidgetIntent::EventAdded(record) => {
                let id = record.id.clone();
                store.add(record)?;
                Ok(IntentOutcome::Added(id))
            }
            WidgetIntent::EventChanged(record) => {
                let id = record.id.clone();
                let matched = store.update(record)?;
                Ok(IntentOutcome::Updated { id, matched })
            }
            WidgetIntent::EventRemoved(id) => {
                let matched = store.remove(&id)?;
                Ok(IntentOutcome::Removed { id, matched })
            }
        }
    }

    /// Completes a pending date-click create.
    ///
    /// # Errors
    /// - `BridgeError::UnknownRequest` when the id is not pending.
    /// - `BridgeError::Store` when the store or one of its observers fails.
    pub fn fulfill_title(
        &mut self,
        store: &mut EventStore,
        response: TitleResponse,
    ) -> BridgeResult<IntentOutcome> {
        let request = self
            .pending
            .remove(&response.request_id)
            .ok_or(BridgeError::UnknownRequest(response.request_id))?;

        let Some(title) = response.title.filter(|title| !title.is_empty()) else {
            info!(
                "event=title_request module=bridge status=skip reason=cancelled request_id={}",
                request.request_id
            );
            return Ok(IntentOutcome::Cancelled(request.request_id));
        };

        let record = EventRecord::new(EventId::generate(), title, request.date, request.all_day);
        let id = record.id.clone();
        store.add(record)?;

        info!(
            "event=title_request module=bridge status=ok request_id={} id={}",
            request.request_id, id
        );
        Ok(IntentOutcome::Added(id))
    }

    /// Outstanding title requests, oldest first.
    pub fn pending_requests(&self) -> impl Iterator<Item = &TitleRequest> {
        self.pending.values()
    }

    /// Drops every outstanding title request. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    fn open_request(&mut self, date: EventTime, all_day: bool) -> TitleRequest {
        self.next_request += 1;
        let request = TitleRequest {
            request_id: TitleRequestId(self.next_request),
            date,
            all_day,
        };
        self.pending.insert(request.request_id, request.clone());

        debug!(
            "event=title_request module=bridge status=start request_id={} all_day={}",
            request.request_id, all_day
        );
        request
    }
}

#[cfg(test)]
mod tests {
    use super::{IntentOutcome, MutationBridge, TitleResponse, WidgetIntent};
    use crate::model::event::EventTime;
    use crate::store::EventStore;

    fn click(bridge: &mut MutationBridge, store: &mut EventStore) -> super::TitleRequest {
        let date: EventTime = "2024-06-01".parse().unwrap();
        match bridge
            .handle(store, WidgetIntent::DateClick { date, all_day: true })
            .unwrap()
        {
            IntentOutcome::TitleRequested(request) => request,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn pending_requests_are_independent() {
        let mut bridge = MutationBridge::new();
        let mut store = EventStore::new();

        let first = click(&mut bridge, &mut store);
        let second = click(&mut bridge, &mut store);
        assert_ne!(first.request_id, second.request_id);
        assert_eq!(bridge.pending_requests().count(), 2);

        bridge
            .fulfill_title(
                &mut store,
                TitleResponse {
                    request_id: second.request_id,
                    title: Some("Second".to_string()),
                },
            )
            .unwrap();

        let remaining: Vec<_> = bridge.pending_requests().collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].request_id, first.request_id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cancel_all_drops_pending_requests() {
        let mut bridge = MutationBridge::new();
        let mut store = EventStore::new();
        let request = click(&mut bridge, &mut store);

        assert_eq!(bridge.cancel_all(), 1);
        assert!(bridge
            .fulfill_title(
                &mut store,
                TitleResponse {
                    request_id: request.request_id,
                    title: Some("late".to_string()),
                },
            )
            .is_err());
        assert!(store.is_empty());
    }
}
