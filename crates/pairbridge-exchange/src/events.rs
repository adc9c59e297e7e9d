//! Append-only event sink shared by exchanges and the registry.

use std::sync::Arc;

use chrono::Utc;
use pairbridge_types::{Address, Event, EventKind, EventRecord};
use parking_lot::Mutex;

/// Cloneable handle to one append-only log of [`EventRecord`]s.
///
/// Operations buffer their events and call [`EventLog::commit`] only after
/// the mutation succeeded, so an aborted call leaves no trace here.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `events` from `emitter` in order.
    pub fn commit(&self, emitter: Address, events: impl IntoIterator<Item = Event>) {
        let mut records = self.records.lock();
        let now = Utc::now();
        for event in events {
            let sequence = records.len() as u64;
            tracing::trace!(sequence, emitter = %emitter, kind = %event.kind(), "Event committed");
            records.push(EventRecord {
                sequence,
                emitter,
                event,
                emitted_at: now,
            });
        }
    }

    /// Append a single event.
    pub fn emit(&self, emitter: Address, event: Event) {
        self.commit(emitter, std::iter::once(event));
    }

    /// Copy of every record so far.
    #[must_use]
    pub fn records(&self) -> Vec<EventRecord> {
        self.records.lock().clone()
    }

    /// Records of one kind, in log order.
    #[must_use]
    pub fn of_kind(&self, kind: EventKind) -> Vec<EventRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.event.kind() == kind)
            .cloned()
            .collect()
    }

    /// Records emitted by one contract, in log order.
    #[must_use]
    pub fn by_emitter(&self, emitter: Address) -> Vec<EventRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.emitter == emitter)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
