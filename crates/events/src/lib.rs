//! Event contracts and distribution mechanics.
//!
//! Domain crates describe what happened as typed events; this crate provides the
//! envelope they travel in and the bus that fans them out to downstream
//! consumers (stock reservation, picking UI, projections).

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::{EnvelopeHeader, EventEnvelope};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
