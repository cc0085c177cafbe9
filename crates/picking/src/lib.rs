//! Picking-location planning (FEFO allocation + pick-task sequencing).
//!
//! Given a load of orders, the planner decides which stock lots every line
//! item is drawn from (First-Expiring-First-Out), splits a line across lots
//! when one is not enough, and orders the resulting pick tasks to keep
//! warehouse travel short. A load is planned entirely or not at all.
//!
//! Pure pieces (`allocator`, `proximity`, `sequencer`, the `Load` aggregate)
//! do no IO. The `planner` talks to stock, layout and reservation services only
//! through the traits in `ports`.

pub mod allocator;
pub mod error;
pub mod ids;
pub mod load;
pub mod planner;
pub mod ports;
pub mod proximity;
pub mod sequencer;
pub mod task;

pub use allocator::{AllocationError, AllocationSplit, Shortfall, allocate};
pub use error::{LineShortfall, PlanningError};
pub use ids::{LineItemId, LoadId, OrderId, PickTaskId};
pub use load::{
    AssignOrder, CreateLoad, LineItemRequirement, Load, LoadCommand, LoadCreated, LoadEvent,
    LoadLineItem, LoadOrder, LoadPlanned, LoadStatus, OrderAssigned, OrderPlanningStatus,
    PickTasksCreated, PlanLoad,
};
pub use planner::{PlanOutcome, PlanResult, PlanningContext, PlanningOrchestrator};
pub use ports::{
    AvailabilityProvider, LocationResolver, LotReservation, ProviderError, ReservationError,
    ReservationLedger,
};
pub use proximity::{ProximityScorer, ZoneDistanceScorer, ZonePriorityTable};
pub use sequencer::sequence;
pub use task::{LineAllocation, PickTask, TaskDraft};
