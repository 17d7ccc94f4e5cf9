use crate::domain::events::EventEnvelope;
use crate::ports::event_store::{EventStore as EventStoreTrait, EventStoreError, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory implementation of EventStore
///
/// Keeps one append-only stream per aggregate plus a global index in
/// insertion order. Appends take the store lock for the duration of the
/// version check and the writes, so appends to a single aggregate are
/// serialized and either all events of a batch land or none do.
pub struct MemoryEventStore {
    state: Mutex<LogState>,
}

#[derive(Default)]
struct LogState {
    streams: HashMap<Uuid, Vec<EventEnvelope>>,
    /// Global insertion-order index backing `stream_all`.
    all: Vec<EventEnvelope>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LogState::default()),
        }
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStoreTrait for MemoryEventStore {
    async fn append(&self, aggregate_id: Uuid, events: Vec<EventEnvelope>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut state = self.state.lock().unwrap();

        let last_version = state
            .streams
            .get(&aggregate_id)
            .and_then(|stream| stream.last())
            .map(|envelope| envelope.version)
            .unwrap_or(0);

        // The k-th appended event must carry version last + k.
        for (i, envelope) in events.iter().enumerate() {
            let expected = last_version + (i as u64) + 1;
            if envelope.version != expected {
                return Err(EventStoreError::VersionConflict {
                    aggregate_id,
                    expected,
                    found: envelope.version,
                });
            }
        }

        for envelope in events {
            state
                .streams
                .entry(aggregate_id)
                .or_default()
                .push(envelope.clone());
            state.all.push(envelope);
        }

        Ok(())
    }

    async fn load(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope>> {
        let state = self.state.lock().unwrap();
        Ok(state.streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    fn stream_all(&self) -> BoxStream<'_, Result<EventEnvelope>> {
        let mut all = {
            let state = self.state.lock().unwrap();
            state.all.clone()
        };

        // Chronological by occurred_at; the sort is stable, so ties keep
        // insertion order.
        all.sort_by_key(|envelope| envelope.occurred_at);

        Box::pin(stream::iter(all.into_iter().map(Ok)))
    }

    async fn exists(&self, aggregate_id: Uuid) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.streams.contains_key(&aggregate_id))
    }
}
