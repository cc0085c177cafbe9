//! Infrastructure layer: stores, port adapters, dispatch and configuration.

pub mod command_dispatcher;
pub mod config;
pub mod event_store;
pub mod location_directory;
pub mod lot_store;
pub mod planning_dispatcher;
pub mod retry;


pub use command_dispatcher::{CommandDispatcher, DispatchError};
pub use config::PlanningConfig;
pub use event_store::{
    EventHeader, EventStore, EventStoreError, InMemoryEventStore, StoredEvent, UncommittedEvent,
};
pub use location_directory::InMemoryLocationDirectory;
pub use lot_store::{InMemoryLotStore, StockedLot};
pub use planning_dispatcher::{LOAD_AGGREGATE_TYPE, PlanningDispatchError, PlanningDispatcher};
pub use retry::{BackoffStrategy, RetryPolicy};
