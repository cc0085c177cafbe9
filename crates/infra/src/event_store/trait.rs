use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use forgewms_core::{AggregateId, ExpectedVersion, TenantId};
use forgewms_events::{EnvelopeHeader, Event, EventEnvelope};

/// Identity, stream and schema of one event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHeader {
    pub event_id: Uuid,
    pub tenant_id: TenantId,
    pub aggregate_id: AggregateId,
    pub aggregate_type: String,
    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,
}

/// An encoded event waiting to be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncommittedEvent {
    pub header: EventHeader,
    pub payload: JsonValue,
}

/// An appended event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub header: EventHeader,
    /// 1-based, gap-free position in the aggregate stream.
    pub sequence_number: u64,
    pub payload: JsonValue,
}

impl UncommittedEvent {
    /// Serialize a typed event under `aggregate_type`. The event's category
    /// must match the aggregate type.
    pub fn encode<E>(
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        event_id: Uuid,
        event: &E,
    ) -> Result<Self, EventStoreError>
    where
        E: Event + Serialize,
    {
        if event.category() != aggregate_type {
            return Err(EventStoreError::AggregateTypeMismatch(format!(
                "{} cannot be stored in a '{aggregate_type}' stream",
                event.event_type()
            )));
        }
        let payload =
            serde_json::to_value(event).map_err(|e| EventStoreError::Codec(e.to_string()))?;

        Ok(Self {
            header: EventHeader {
                event_id,
                tenant_id,
                aggregate_id,
                aggregate_type: aggregate_type.to_string(),
                event_type: event.event_type().to_string(),
                event_version: event.version(),
                occurred_at: event.occurred_at(),
            },
            payload,
        })
    }

    pub(crate) fn commit(self, sequence_number: u64) -> StoredEvent {
        StoredEvent {
            header: self.header,
            sequence_number,
            payload: self.payload,
        }
    }
}

impl StoredEvent {
    pub fn decode<E: DeserializeOwned>(&self) -> Result<E, EventStoreError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            EventStoreError::Codec(format!(
                "{} #{}: {e}",
                self.header.event_type, self.sequence_number
            ))
        })
    }

    /// Envelope for publication; keeps the event id for consumer dedup.
    pub fn to_envelope(&self) -> EventEnvelope<JsonValue> {
        let h = &self.header;
        EventEnvelope::new(
            EnvelopeHeader {
                event_id: h.event_id,
                tenant_id: h.tenant_id,
                aggregate_id: h.aggregate_id,
                aggregate_type: h.aggregate_type.clone(),
                event_type: h.event_type.clone(),
                event_version: h.event_version,
                sequence_number: self.sequence_number,
                occurred_at: h.occurred_at,
            },
            self.payload.clone(),
        )
    }
}

#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    #[error("aggregate type mismatch: {0}")]
    AggregateTypeMismatch(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("payload codec error: {0}")]
    Codec(String),

    #[error("event store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only, tenant-scoped event store.
///
/// A batch belongs to one `(tenant, aggregate)` stream and is appended
/// atomically at `current + 1 ..`, only if `expected_version` matches the
/// current stream version.
pub trait EventStore: Send + Sync {
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError>;

    /// Full stream in sequence order; empty if the aggregate does not exist.
    fn load_stream(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<Vec<StoredEvent>, EventStoreError>;

    fn stream_version(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<u64, EventStoreError> {
        Ok(self
            .load_stream(tenant_id, aggregate_id)?
            .last()
            .map(|e| e.sequence_number)
            .unwrap_or(0))
    }
}

impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).append(events, expected_version)
    }

    fn load_stream(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).load_stream(tenant_id, aggregate_id)
    }

    fn stream_version(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<u64, EventStoreError> {
        (**self).stream_version(tenant_id, aggregate_id)
    }
}
