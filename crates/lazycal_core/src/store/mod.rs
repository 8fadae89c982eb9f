//! In-memory event collection for one calendar session.
//!
//! # Responsibility
//! - Hold the canonical, insertion-ordered list of `EventRecord`s.
//! - Apply add/update/remove/replace-all mutations.
//! - Notify subscribed observers after every applied mutation.
//!
//! # Invariants
//! - No two records share an `EventId` in any reachable state.
//! - Observers always see the collection as it is right after the mutation
//!   that triggered them (mutate, then notify).
//! - `update`/`remove` of an unknown id is a no-op, not an error.

pub mod observer;

use crate::model::event::{EventId, EventRecord};
use log::{debug, error, warn};
use observer::{ObserverError, StoreObserver, SubscriptionId};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store mutation error.
#[derive(Debug)]
pub enum StoreError {
    /// `add` was called with an id already present; nothing changed.
    DuplicateId(EventId),
    /// The mutation was applied but an observer failed while handling it.
    Observer {
        subscription: SubscriptionId,
        source: ObserverError,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "event id already exists: {id}"),
            Self::Observer {
                subscription,
                source,
            } => write!(f, "store observer {subscription} failed: {source}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DuplicateId(_) => None,
            Self::Observer { source, .. } => Some(&**source),
        }
    }
}

/// Single-writer owner of the session's event records.
#[derive(Default)]
pub struct EventStore {
    records: Vec<EventRecord>,
    observers: Vec<(SubscriptionId, Box<dyn StoreObserver>)>,
    next_subscription: u64,
}

impl Debug for EventStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("records", &self.records)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record` to the collection.
    ///
    /// # Errors
    /// - `StoreError::DuplicateId` when a record with the same id exists; the
    ///   collection is left untouched and observers are not called.
    /// - `StoreError::Observer` when an observer fails after the append.
    pub fn add(&mut self, record: EventRecord) -> StoreResult<()> {
        if self.contains(&record.id) {
            warn!(
                "event=store_add module=store status=error error_code=duplicate_id id={}",
                record.id
            );
            return Err(StoreError::DuplicateId(record.id));
        }

        debug!(
            "event=store_add module=store status=ok id={} count={}",
            record.id,
            self.records.len() + 1
        );
        self.records.push(record);
        self.notify()
    }

    /// Replaces the record sharing `record.id` wholesale.
    ///
    /// Returns whether a record matched. Observers are notified either way.
    pub fn update(&mut self, record: EventRecord) -> StoreResult<bool> {
        let matched = match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        };

        debug!(
            "event=store_update module=store status={} count={}",
            if matched { "ok" } else { "skip" },
            self.records.len()
        );
        self.notify()?;
        Ok(matched)
    }

    /// Removes the record with `id`.
    ///
    /// Returns whether a record was removed. Observers are notified either way.
    pub fn remove(&mut self, id: &EventId) -> StoreResult<bool> {
        let before = self.records.len();
        self.records.retain(|r| &r.id != id);
        let removed = self.records.len() != before;

        debug!(
            "event=store_remove module=store status={} id={} count={}",
            if removed { "ok" } else { "skip" },
            id,
            self.records.len()
        );
        self.notify()?;
        Ok(removed)
    }

    /// Discards the collection and installs `records`.
    ///
    /// Later records repeating an earlier id are dropped so the uniqueness
    /// invariant holds. Returns the number of records installed.
    pub fn replace_all(&mut self, records: Vec<EventRecord>) -> StoreResult<usize> {
        let incoming = records.len();
        let mut seen = HashSet::with_capacity(incoming);
        let unique: Vec<EventRecord> = records
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();

        if unique.len() != incoming {
            warn!(
                "event=store_replace_all module=store status=ok dropped_duplicates={}",
                incoming - unique.len()
            );
        }
        debug!(
            "event=store_replace_all module=store status=ok count={}",
            unique.len()
        );

        self.records = unique;
        self.notify()?;
        Ok(self.records.len())
    }

    /// Read-only view of the current collection, in insertion order.
    pub fn snapshot(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn get(&self, id: &EventId) -> Option<&EventRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Registers an observer called after every applied mutation.
    pub fn subscribe(&mut self, observer: impl StoreObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Drops an observer. Returns `false` when `id` is not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // Stops at the first failing observer; later observers are not called.
    fn notify(&mut self) -> StoreResult<()> {
        let records = self.records.as_slice();
        for (subscription, observer) in &mut self.observers {
            if let Err(source) = observer.on_change(records) {
                error!(
                    "event=store_notify module=store status=error subscription={} error={}",
                    subscription, source
                );
                return Err(StoreError::Observer {
                    subscription: *subscription,
                    source,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::observer::ObserverResult;
    use super::{EventStore, StoreError};
    use crate::model::event::{EventId, EventRecord};
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(id: &str, title: &str) -> EventRecord {
        EventRecord::new(
            EventId::new(id).unwrap(),
            title,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            true,
        )
    }

    #[test]
    fn duplicate_add_is_rejected_without_notification() {
        let mut store = EventStore::new();
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        store.subscribe(move |_: &[EventRecord]| -> ObserverResult {
            *seen.borrow_mut() += 1;
            Ok(())
        });

        store.add(record("1", "Lunch")).unwrap();
        let err = store.add(record("1", "Other")).unwrap_err();

        assert!(matches!(err, StoreError::DuplicateId(ref id) if id.as_str() == "1"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot()[0].title, "Lunch");
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn replace_all_keeps_first_of_repeated_ids() {
        let mut store = EventStore::new();
        let installed = store
            .replace_all(vec![record("1", "a"), record("2", "b"), record("1", "c")])
            .unwrap();

        assert_eq!(installed, 2);
        assert_eq!(store.get(&EventId::new("1").unwrap()).unwrap().title, "a");
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = EventStore::new();
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        let sub = store.subscribe(move |_: &[EventRecord]| -> ObserverResult {
            *seen.borrow_mut() += 1;
            Ok(())
        });

        store.add(record("1", "a")).unwrap();
        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.add(record("2", "b")).unwrap();

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(store.observer_count(), 0);
    }
}
