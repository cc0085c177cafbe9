//! Command execution pipeline for event-sourced aggregates.
//!
//! ```text
//! Command
//!   ↓ 1. load stream (tenant-scoped) and validate it
//!   ↓ 2. rehydrate the aggregate
//!   ↓ 3. handle (pure decision, produces events)
//!   ↓ 4. append with ExpectedVersion::Exact(stream version)
//!   ↓ 5. publish committed envelopes
//! ```
//!
//! Used for the Load lifecycle commands (create, assign orders). Planning has
//! extra commit steps and goes through `PlanningDispatcher`, which shares the
//! load/rehydrate helpers below.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use forgewms_core::{Aggregate, AggregateId, DomainError, ExpectedVersion, TenantId};
use forgewms_events::{EventBus, EventEnvelope};

use crate::event_store::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The stream moved since it was loaded; reload and retry.
    #[error("concurrency conflict: {0}")]
    Concurrency(String),

    /// A loaded stream contained another tenant's or aggregate's events.
    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The aggregate's state rejects the command (e.g. order already
    /// assigned, load already planned).
    #[error("command rejected: {0}")]
    Rejected(String),

    #[error("not found")]
    NotFound,

    /// A stored payload could not be read back as the aggregate's event type.
    #[error("event codec error: {0}")]
    Codec(String),

    #[error("event store error: {0}")]
    Store(EventStoreError),

    /// Publication failed after a successful append; the events are stored
    /// and can be republished.
    #[error("publish failed: {0}")]
    Publish(String),
}

impl From<EventStoreError> for DispatchError {
    fn from(value: EventStoreError) -> Self {
        match value {
            EventStoreError::Concurrency(msg) => DispatchError::Concurrency(msg),
            EventStoreError::TenantIsolation(msg) => DispatchError::TenantIsolation(msg),
            EventStoreError::Codec(msg) => DispatchError::Codec(msg),
            other => DispatchError::Store(other),
        }
    }
}

impl From<DomainError> for DispatchError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => DispatchError::Validation(msg),
            DomainError::InvariantViolation(msg) => DispatchError::InvariantViolation(msg),
            DomainError::Conflict(msg) => DispatchError::Rejected(msg),
            DomainError::NotFound => DispatchError::NotFound,
        }
    }
}

/// Reusable command execution engine.
///
/// Generic over the store and bus so tests run on the in-memory pair and
/// deployments swap in durable backends.
#[derive(Debug)]
pub struct CommandDispatcher<S, B> {
    store: S,
    bus: B,
}

impl<S, B> CommandDispatcher<S, B> {
    pub fn new(store: S, bus: B) -> Self {
        Self { store, bus }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_parts(self) -> (S, B) {
        (self.store, self.bus)
    }
}

impl<S, B> CommandDispatcher<S, B>
where
    S: EventStore,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    /// Run `command` against the aggregate and persist + publish its events.
    ///
    /// Returns the committed events. A version race surfaces as
    /// `DispatchError::Concurrency`; callers reload and retry.
    pub fn dispatch<A>(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        command: A::Command,
        make_aggregate: impl FnOnce(TenantId, AggregateId) -> A,
    ) -> Result<Vec<StoredEvent>, DispatchError>
    where
        A: Aggregate<Error = DomainError>,
        A::Event: forgewms_events::Event + Serialize + DeserializeOwned,
    {
        let (aggregate, version) =
            rehydrate(&self.store, tenant_id, aggregate_id, make_aggregate)?;

        let decided = aggregate.handle(&command).map_err(DispatchError::from)?;
        if decided.is_empty() {
            return Ok(vec![]);
        }

        let committed = append_events(
            &self.store,
            tenant_id,
            aggregate_id,
            aggregate_type,
            &decided,
            ExpectedVersion::Exact(version),
        )?;
        publish_committed(&self.bus, &committed)?;

        Ok(committed)
    }

    /// Current state of an aggregate (read-only).
    pub fn load<A>(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        make_aggregate: impl FnOnce(TenantId, AggregateId) -> A,
    ) -> Result<A, DispatchError>
    where
        A: Aggregate,
        A::Event: DeserializeOwned,
    {
        rehydrate(&self.store, tenant_id, aggregate_id, make_aggregate).map(|(a, _)| a)
    }
}

/// Load, validate and replay a stream. Returns the aggregate and the stream
/// version to expect on the next append.
pub(crate) fn rehydrate<S, A>(
    store: &S,
    tenant_id: TenantId,
    aggregate_id: AggregateId,
    make_aggregate: impl FnOnce(TenantId, AggregateId) -> A,
) -> Result<(A, u64), DispatchError>
where
    S: EventStore,
    A: Aggregate,
    A::Event: DeserializeOwned,
{
    let history = store.load_stream(tenant_id, aggregate_id)?;
    validate_loaded_stream(tenant_id, aggregate_id, &history)?;

    let mut aggregate = make_aggregate(tenant_id, aggregate_id);
    apply_history::<A>(&mut aggregate, &history)?;
    let version = history.last().map(|e| e.sequence_number).unwrap_or(0);
    Ok((aggregate, version))
}

pub(crate) fn append_events<S, E>(
    store: &S,
    tenant_id: TenantId,
    aggregate_id: AggregateId,
    aggregate_type: &str,
    events: &[E],
    expected: ExpectedVersion,
) -> Result<Vec<StoredEvent>, DispatchError>
where
    S: EventStore,
    E: forgewms_events::Event + Serialize,
{
    let uncommitted = events
        .iter()
        .map(|ev| {
            UncommittedEvent::encode(tenant_id, aggregate_id, aggregate_type, Uuid::now_v7(), ev)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(store.append(uncommitted, expected)?)
}

pub(crate) fn publish_committed<B>(bus: &B, committed: &[StoredEvent]) -> Result<(), DispatchError>
where
    B: EventBus<EventEnvelope<JsonValue>>,
{
    bus.publish_all(committed.iter().map(StoredEvent::to_envelope))
        .map(|_| ())
        .map_err(|(sent, e)| {
            DispatchError::Publish(format!("{sent} of {} published: {e:?}", committed.len()))
        })
}

fn validate_loaded_stream(
    tenant_id: TenantId,
    aggregate_id: AggregateId,
    stream: &[StoredEvent],
) -> Result<(), DispatchError> {
    // A buggy backend must not leak another tenant's stream into this one.
    let mut last = 0u64;
    for (idx, e) in stream.iter().enumerate() {
        if e.header.tenant_id != tenant_id {
            return Err(DispatchError::TenantIsolation(format!(
                "loaded stream contains wrong tenant_id at index {idx}"
            )));
        }
        if e.header.aggregate_id != aggregate_id {
            return Err(DispatchError::TenantIsolation(format!(
                "loaded stream contains wrong aggregate_id at index {idx}"
            )));
        }
        if e.sequence_number <= last {
            return Err(DispatchError::Store(EventStoreError::InvalidAppend(format!(
                "non-monotonic sequence_number in loaded stream (last={last}, found={})",
                e.sequence_number
            ))));
        }
        last = e.sequence_number;
    }
    Ok(())
}

fn apply_history<A>(aggregate: &mut A, history: &[StoredEvent]) -> Result<(), DispatchError>
where
    A: Aggregate,
    A::Event: DeserializeOwned,
{
    for stored in history {
        let ev: A::Event = stored.decode()?;
        aggregate.apply(&ev);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use forgewms_events::InMemoryEventBus;
    use forgewms_inventory::ProductId;
    use forgewms_picking::{
        AssignOrder, CreateLoad, LineItemId, Load, LoadCommand, LoadId, LoadLineItem, OrderId,
    };

    use crate::event_store::InMemoryEventStore;

    type Dispatcher =
        CommandDispatcher<Arc<InMemoryEventStore>, InMemoryEventBus<EventEnvelope<JsonValue>>>;

    fn make(_: TenantId, id: AggregateId) -> Load {
        Load::empty(LoadId::new(id))
    }

    fn create(
        d: &Dispatcher,
        tenant_id: TenantId,
        load_id: LoadId,
        aggregate_type: &str,
    ) -> Result<Vec<StoredEvent>, DispatchError> {
        d.dispatch(
            tenant_id,
            load_id.0,
            aggregate_type,
            LoadCommand::CreateLoad(CreateLoad {
                tenant_id,
                load_id,
                occurred_at: Utc::now(),
            }),
            make,
        )
    }

    fn assign(
        d: &Dispatcher,
        tenant_id: TenantId,
        load_id: LoadId,
        order_id: OrderId,
    ) -> Result<Vec<StoredEvent>, DispatchError> {
        d.dispatch(
            tenant_id,
            load_id.0,
            "picking.load",
            LoadCommand::AssignOrder(AssignOrder {
                tenant_id,
                load_id,
                order_id,
                lines: vec![LoadLineItem {
                    line_item_id: LineItemId::generate(),
                    product_id: ProductId::generate(),
                    quantity: 2,
                }],
                occurred_at: Utc::now(),
            }),
            make,
        )
    }

    #[test]
    fn dispatch_appends_then_publishes() {
        let d = Dispatcher::new(Arc::new(InMemoryEventStore::new()), InMemoryEventBus::new());
        let sub = d.bus.subscribe();
        let (tenant, load_id) = (TenantId::new(), LoadId::generate());

        create(&d, tenant, load_id, "picking.load").unwrap();
        let committed = assign(&d, tenant, load_id, OrderId::generate()).unwrap();

        assert_eq!(committed[0].sequence_number, 2);
        let published = sub.drain();
        assert_eq!(published.len(), 2);
        assert_eq!(published[1].event_type(), "picking.load.order_assigned");
        assert_eq!(published[1].event_id(), committed[0].header.event_id);
        assert_eq!(d.load(tenant, load_id.0, make).unwrap().orders().len(), 1);
    }

    #[test]
    fn rejected_command_is_not_a_concurrency_error() {
        let d = Dispatcher::new(Arc::new(InMemoryEventStore::new()), InMemoryEventBus::new());
        let (tenant, load_id, order) = (TenantId::new(), LoadId::generate(), OrderId::generate());
        create(&d, tenant, load_id, "picking.load").unwrap();
        assign(&d, tenant, load_id, order).unwrap();

        let err = assign(&d, tenant, load_id, order).unwrap_err();
        assert!(matches!(err, DispatchError::Rejected(_)));
        assert!(matches!(
            assign(&d, tenant, LoadId::generate(), order),
            Err(DispatchError::NotFound)
        ));
    }

    #[test]
    fn events_cannot_be_filed_under_another_aggregate_type() {
        let d = Dispatcher::new(Arc::new(InMemoryEventStore::new()), InMemoryEventBus::new());
        let (tenant, load_id) = (TenantId::new(), LoadId::generate());

        let err = create(&d, tenant, load_id, "inventory.lot").unwrap_err();

        assert!(matches!(err, DispatchError::Store(EventStoreError::AggregateTypeMismatch(_))));
        assert!(d.store().load_stream(tenant, load_id.0).unwrap().is_empty());
    }
}
