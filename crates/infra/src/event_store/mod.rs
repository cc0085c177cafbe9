//! Append-only event store boundary.
//!
//! Load streams are keyed by `(tenant_id, aggregate_id)`. Planning appends
//! with an exact expected version, so of two plans racing on one load only
//! the first commits.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use r#trait::{EventHeader, EventStore, EventStoreError, StoredEvent, UncommittedEvent};
