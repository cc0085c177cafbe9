use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgewms_core::{AggregateId, TenantId};

/// A committed event as consumers receive it.
///
/// `event_id` is the idempotency key: redelivery of the same stored event
/// carries the same id. `(aggregate_id, sequence_number)` orders events of
/// one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    tenant_id: TenantId,
    aggregate_id: AggregateId,
    aggregate_type: String,
    event_type: String,
    event_version: u32,
    sequence_number: u64,
    occurred_at: DateTime<Utc>,
    payload: E,
}

/// Stream coordinates and schema of an envelope, without the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub event_id: Uuid,
    pub tenant_id: TenantId,
    pub aggregate_id: AggregateId,
    pub aggregate_type: String,
    pub event_type: String,
    pub event_version: u32,
    pub sequence_number: u64,
    pub occurred_at: DateTime<Utc>,
}

impl<E> EventEnvelope<E> {
    pub fn new(header: EnvelopeHeader, payload: E) -> Self {
        Self {
            event_id: header.event_id,
            tenant_id: header.tenant_id,
            aggregate_id: header.aggregate_id,
            aggregate_type: header.aggregate_type,
            event_type: header.event_type,
            event_version: header.event_version,
            sequence_number: header.sequence_number,
            occurred_at: header.occurred_at,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> u32 {
        self.event_version
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }

    /// Convert the payload (e.g. decode JSON into a typed event), keeping
    /// the stream metadata.
    pub fn try_map_payload<T, Err>(
        self,
        f: impl FnOnce(E) -> Result<T, Err>,
    ) -> Result<EventEnvelope<T>, Err> {
        let payload = f(self.payload)?;
        Ok(EventEnvelope {
            event_id: self.event_id,
            tenant_id: self.tenant_id,
            aggregate_id: self.aggregate_id,
            aggregate_type: self.aggregate_type,
            event_type: self.event_type,
            event_version: self.event_version,
            sequence_number: self.sequence_number,
            occurred_at: self.occurred_at,
            payload,
        })
    }
}
