use std::collections::HashMap;
use std::sync::RwLock;

use forgewms_core::{AggregateId, ExpectedVersion, TenantId};

use super::r#trait::{EventHeader, EventStore, EventStoreError, StoredEvent, UncommittedEvent};

type StreamKey = (TenantId, AggregateId);

/// Append-only store keeping every stream in a `Vec` (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<StreamKey, Vec<StoredEvent>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The single stream a batch targets, or why the batch is malformed.
fn batch_stream(events: &[UncommittedEvent]) -> Result<Option<&EventHeader>, EventStoreError> {
    let Some(first) = events.first().map(|e| &e.header) else {
        return Ok(None);
    };
    for (idx, e) in events.iter().enumerate().skip(1) {
        let h = &e.header;
        if h.tenant_id != first.tenant_id {
            return Err(EventStoreError::TenantIsolation(format!(
                "batch mixes tenants (index {idx})"
            )));
        }
        if h.aggregate_id != first.aggregate_id {
            return Err(EventStoreError::InvalidAppend(format!(
                "batch mixes aggregates (index {idx})"
            )));
        }
        if h.aggregate_type != first.aggregate_type {
            return Err(EventStoreError::AggregateTypeMismatch(format!(
                "batch mixes aggregate types (index {idx})"
            )));
        }
    }
    Ok(Some(first))
}

impl EventStore for InMemoryEventStore {
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let Some(target) = batch_stream(&events)? else {
            return Ok(vec![]);
        };
        let key = (target.tenant_id, target.aggregate_id);
        let aggregate_type = target.aggregate_type.clone();

        let mut streams = self
            .streams
            .write()
            .map_err(|_| EventStoreError::Unavailable("lock poisoned".to_string()))?;
        let stream = streams.entry(key).or_default();

        let current = stream.last().map(|e| e.sequence_number).unwrap_or(0);
        if !expected_version.matches(current) {
            return Err(EventStoreError::Concurrency(format!(
                "expected {expected_version:?}, stream is at {current}"
            )));
        }
        if let Some(existing) = stream.first() {
            if existing.header.aggregate_type != aggregate_type {
                return Err(EventStoreError::AggregateTypeMismatch(format!(
                    "stream holds '{}', batch is '{aggregate_type}'",
                    existing.header.aggregate_type
                )));
            }
        }
        // Event ids are idempotency keys; a replayed append must not land twice.
        if let Some(dup) = events
            .iter()
            .find(|e| stream.iter().any(|s| s.header.event_id == e.header.event_id))
        {
            return Err(EventStoreError::InvalidAppend(format!(
                "event {} already stored",
                dup.header.event_id
            )));
        }

        let committed: Vec<StoredEvent> = events
            .into_iter()
            .zip(current + 1..)
            .map(|(e, sequence_number)| e.commit(sequence_number))
            .collect();
        stream.extend(committed.iter().cloned());

        Ok(committed)
    }

    fn load_stream(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| EventStoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(streams
            .get(&(tenant_id, aggregate_id))
            .cloned()
            .unwrap_or_default())
    }
}
