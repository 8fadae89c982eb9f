//! Change-notification contracts for the event store.

use crate::model::event::EventRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error type observers report back through the store.
pub type ObserverError = Box<dyn Error + Send + Sync + 'static>;

pub type ObserverResult = Result<(), ObserverError>;

/// Handle returned by `EventStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Receives the full post-mutation collection after every store change.
///
/// # Contract
/// - Called synchronously, after the mutation is applied.
/// - Must not assume the slice outlives the call.
pub trait StoreObserver {
    fn on_change(&mut self, records: &[EventRecord]) -> ObserverResult;
}

impl<F> StoreObserver for F
where
    F: FnMut(&[EventRecord]) -> ObserverResult,
{
    fn on_change(&mut self, records: &[EventRecord]) -> ObserverResult {
        self(records)
    }
}
