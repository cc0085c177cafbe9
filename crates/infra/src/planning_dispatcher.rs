//! Planning pipeline for Load aggregates.
//!
//! ```text
//! plan_load(tenant, load_id)
//!   ↓ 1. load + rehydrate the Load stream
//!   ↓ 2. PlanningOrchestrator::plan (allocate, sequence, reserve lots)
//!   ↓ 3. append [LoadPlanned, PickTasksCreated] with ExpectedVersion::Exact
//!   ↓      └─ lost the race? release the lot reservations, report a conflict
//!   ↓ 4. publish committed envelopes
//! ```

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, info, warn};

use forgewms_core::{ExpectedVersion, TenantId};
use forgewms_events::{EventBus, EventEnvelope};
use forgewms_picking::{
    AvailabilityProvider, Load, LoadId, LocationResolver, PlanOutcome, PlanningContext,
    PlanningError, PlanningOrchestrator, ProximityScorer, ReservationLedger,
};

use crate::command_dispatcher::{DispatchError, append_events, publish_committed, rehydrate};
use crate::event_store::EventStore;
use crate::retry::RetryPolicy;

/// Aggregate type under which Load streams are stored.
pub const LOAD_AGGREGATE_TYPE: &str = "picking.load";

#[derive(Debug, Error)]
pub enum PlanningDispatchError {
    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl PlanningDispatchError {
    pub fn is_retryable(&self) -> bool {
        match self {
            PlanningDispatchError::Planning(e) => e.is_retryable(),
            PlanningDispatchError::Dispatch(DispatchError::Concurrency(_)) => true,
            PlanningDispatchError::Dispatch(_) => false,
        }
    }

    pub fn planning(&self) -> Option<&PlanningError> {
        match self {
            PlanningDispatchError::Planning(e) => Some(e),
            PlanningDispatchError::Dispatch(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct PlanningDispatcher<S, B, A, L, R, Sc> {
    store: S,
    bus: B,
    orchestrator: PlanningOrchestrator<A, L, R, Sc>,
}

impl<S, B, A, L, R, Sc> PlanningDispatcher<S, B, A, L, R, Sc> {
    pub fn new(store: S, bus: B, orchestrator: PlanningOrchestrator<A, L, R, Sc>) -> Self {
        Self {
            store,
            bus,
            orchestrator,
        }
    }

    pub fn orchestrator(&self) -> &PlanningOrchestrator<A, L, R, Sc> {
        &self.orchestrator
    }
}

impl<S, B, A, L, R, Sc> PlanningDispatcher<S, B, A, L, R, Sc>
where
    S: EventStore,
    B: EventBus<EventEnvelope<JsonValue>>,
    A: AvailabilityProvider,
    L: LocationResolver,
    R: ReservationLedger,
    Sc: ProximityScorer,
{
    /// Plan a stored load once. Nothing is persisted, published or reserved
    /// unless the whole plan commits.
    ///
    /// A `DispatchError::Publish` means the plan *was* committed: the lots
    /// stay reserved and the load is `Planned`, so re-planning fails with
    /// `InvalidPlanState`. Read the sequenced tasks back with [`Self::load`].
    pub fn plan_load(
        &self,
        tenant_id: TenantId,
        load_id: LoadId,
        ctx: &PlanningContext,
    ) -> Result<PlanOutcome, PlanningDispatchError> {
        let (load, version) = rehydrate(&self.store, tenant_id, load_id.0, |_, id| {
            Load::empty(LoadId::new(id))
        })?;

        let outcome = self.orchestrator.plan(tenant_id, &load, ctx)?;

        let committed = match append_events(
            &self.store,
            tenant_id,
            load_id.0,
            LOAD_AGGREGATE_TYPE,
            &outcome.events,
            ExpectedVersion::Exact(version),
        ) {
            Ok(committed) => committed,
            Err(e) => {
                self.compensate(tenant_id, load_id, &outcome);
                return Err(match e {
                    DispatchError::Concurrency(reason) => {
                        warn!(%tenant_id, %load_id, %reason, "load changed while planning");
                        PlanningError::ConcurrentAllocationConflict {
                            lot_id: None,
                            reason: format!("load {load_id} changed during planning: {reason}"),
                        }
                        .into()
                    }
                    other => other.into(),
                });
            }
        };

        // The plan is committed from here on; a publish failure is reported
        // but the events stay in the store for redelivery.
        publish_committed(&self.bus, &committed)?;

        info!(%tenant_id, %load_id, events = committed.len(), "load plan committed");
        Ok(outcome)
    }

    /// `plan_load` re-run against fresh availability while the failure is
    /// retryable. `make_ctx` is called once per attempt.
    pub fn plan_load_with_retry(
        &self,
        tenant_id: TenantId,
        load_id: LoadId,
        policy: &RetryPolicy,
        mut make_ctx: impl FnMut() -> PlanningContext,
    ) -> Result<PlanOutcome, PlanningDispatchError> {
        policy.run(
            |_| self.plan_load(tenant_id, load_id, &make_ctx()),
            PlanningDispatchError::is_retryable,
        )
    }

    /// Current state of a load.
    pub fn load(&self, tenant_id: TenantId, load_id: LoadId) -> Result<Load, DispatchError> {
        rehydrate(&self.store, tenant_id, load_id.0, |_, id| {
            Load::empty(LoadId::new(id))
        })
        .map(|(load, _)| load)
    }

    fn compensate(&self, tenant_id: TenantId, load_id: LoadId, outcome: &PlanOutcome) {
        if let Err(e) = self
            .orchestrator
            .ledger()
            .release(tenant_id, &outcome.reservations)
        {
            error!(%tenant_id, %load_id, error = %e, "failed to release lot reservations");
        }
    }
}
