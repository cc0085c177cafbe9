//! Planning orchestrator: turns a pending load into a committed pick plan.
//!
//! ```text
//! Load (Pending)
//!   ↓ per line item, in load order
//! AvailabilityProvider::query → screen lots → allocate (FEFO)
//!   ↓ any shortfall? → InsufficientStock (all of them), nothing reserved
//! LocationResolver → TaskDraft → sequence (one global sort)
//!   ↓
//! Load::handle(PlanLoad) → [LoadPlanned, PickTasksCreated]
//!   ↓
//! ReservationLedger::reserve (compare-and-swap, all or nothing)
//!   ↓
//! PlanOutcome { next load state, events, tasks }
//! ```
//!
//! Nothing is reserved or emitted unless every line item resolves. The
//! orchestrator never retries; conflicts are returned to the caller.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use forgewms_core::{Aggregate, DomainError, ExpectedVersion, TenantId};
use forgewms_inventory::{Location, LocationId, Lot, LotId};

use crate::allocator::{AllocationError, allocate};
use crate::error::{LineShortfall, PlanningError};
use crate::ids::PickTaskId;
use crate::load::{LineItemRequirement, Load, LoadCommand, LoadEvent, LoadStatus, PlanLoad};
use crate::ports::{
    AvailabilityProvider, LocationResolver, LotReservation, ReservationError, ReservationLedger,
};
use crate::proximity::ProximityScorer;
use crate::sequencer::sequence;
use crate::task::{LineAllocation, PickTask, TaskDraft};

/// Clock inputs for one planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanningContext {
    /// Lots expiring before this date must not be proposed.
    pub as_of: NaiveDate,
    /// Business time stamped on emitted events.
    pub occurred_at: DateTime<Utc>,
}

impl PlanningContext {
    pub fn now() -> Self {
        let occurred_at = Utc::now();
        Self {
            as_of: occurred_at.date_naive(),
            occurred_at,
        }
    }
}

/// A committed plan: the load after applying `events`, the events themselves
/// (to persist and publish) and the sequenced tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub load: Load,
    pub events: Vec<LoadEvent>,
    pub tasks: Vec<PickTask>,
    pub allocations: Vec<LineAllocation>,
    /// Reservations made against the ledger (needed to compensate if the
    /// events cannot be persisted).
    pub reservations: Vec<LotReservation>,
}

pub type PlanResult = Result<PlanOutcome, PlanningError>;

#[derive(Debug, Clone)]
pub struct PlanningOrchestrator<A, L, R, S> {
    availability: A,
    locations: L,
    ledger: R,
    scorer: S,
}

impl<A, L, R, S> PlanningOrchestrator<A, L, R, S> {
    pub fn new(availability: A, locations: L, ledger: R, scorer: S) -> Self {
        Self {
            availability,
            locations,
            ledger,
            scorer,
        }
    }

    pub fn ledger(&self) -> &R {
        &self.ledger
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }
}

impl<A, L, R, S> PlanningOrchestrator<A, L, R, S>
where
    A: AvailabilityProvider,
    L: LocationResolver,
    R: ReservationLedger,
    S: ProximityScorer,
{
    /// Plan every line item of `load` or none of them.
    pub fn plan(&self, tenant_id: TenantId, load: &Load, ctx: &PlanningContext) -> PlanResult {
        let load_id = load.id_typed();
        let span = tracing::info_span!("plan_load", %tenant_id, %load_id);
        let _entered = span.enter();

        if !load.is_created() {
            return Err(DomainError::not_found().into());
        }
        if load.tenant_id() != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch").into());
        }
        if load.status() != LoadStatus::Pending {
            warn!(status = ?load.status(), "rejecting plan for non-pending load");
            return Err(PlanningError::InvalidPlanState {
                load_id,
                status: load.status(),
            });
        }

        let requirements = load.requirements();
        if requirements.is_empty() {
            return Err(DomainError::validation("cannot plan a load without line items").into());
        }
        info!(line_items = requirements.len(), "planning load");

        let mut run = RunLedger::default();
        let mut allocations = Vec::with_capacity(requirements.len());
        let mut shortfalls = Vec::new();

        for req in &requirements {
            let offered = self
                .availability
                .query(tenant_id, req.product_id, req.required_quantity)
                .map_err(|e| {
                    warn!(product_id = %req.product_id, error = %e, "availability query failed");
                    PlanningError::ProviderFault(e.to_string())
                })?;
            let lots = run.screen(req, offered, ctx.as_of)?;

            match allocate(req.product_id, req.required_quantity, &lots) {
                Ok(splits) => {
                    debug!(
                        line_item_id = %req.line_item_id,
                        splits = splits.len(),
                        "line item allocated"
                    );
                    for split in &splits {
                        run.consume(split.lot_id, split.quantity);
                    }
                    allocations.push(LineAllocation {
                        order_id: req.order_id,
                        line_item_id: req.line_item_id,
                        product_id: req.product_id,
                        splits,
                    });
                }
                Err(AllocationError::InsufficientStock(short)) => {
                    warn!(
                        line_item_id = %req.line_item_id,
                        product_id = %short.product_id,
                        required = short.required_quantity,
                        available = short.total_available,
                        "insufficient stock"
                    );
                    shortfalls.push(LineShortfall::new(req, short.total_available));
                }
                Err(e @ AllocationError::NonPositiveRequirement(_)) => {
                    error!(line_item_id = %req.line_item_id, "invalid requirement");
                    return Err(PlanningError::ContractViolation(e.to_string()));
                }
            }
        }

        if !shortfalls.is_empty() {
            return Err(PlanningError::InsufficientStock(shortfalls));
        }

        let drafts = self.draft_tasks(tenant_id, load, &allocations)?;
        let tasks = sequence(drafts, &self.scorer);

        let command = LoadCommand::PlanLoad(PlanLoad {
            tenant_id,
            load_id,
            allocations: allocations.clone(),
            tasks: tasks.clone(),
            occurred_at: ctx.occurred_at,
        });
        let events = load.handle(&command)?;

        let reservations = run.reservations();
        self.ledger
            .reserve(tenant_id, &reservations)
            .map_err(|e| match e {
                ReservationError::Conflict { lot_id, reason } => {
                    warn!(%lot_id, %reason, "lot changed before commit");
                    PlanningError::ConcurrentAllocationConflict {
                        lot_id: Some(lot_id),
                        reason,
                    }
                }
                ReservationError::Unavailable(msg) => PlanningError::ProviderFault(msg),
            })?;

        let mut next = load.clone();
        for ev in &events {
            next.apply(ev);
        }
        info!(tasks = tasks.len(), "load planned");

        Ok(PlanOutcome {
            load: next,
            events,
            tasks,
            allocations,
            reservations,
        })
    }

    fn draft_tasks(
        &self,
        tenant_id: TenantId,
        load: &Load,
        allocations: &[LineAllocation],
    ) -> Result<Vec<TaskDraft>, PlanningError> {
        let mut resolved: HashMap<LocationId, Location> = HashMap::new();
        let mut drafts = Vec::new();

        for alloc in allocations {
            for split in &alloc.splits {
                let location = match resolved.get(&split.location_id) {
                    Some(loc) => loc.clone(),
                    None => {
                        let loc = self
                            .locations
                            .location_of(tenant_id, split.location_id)
                            .map_err(|e| {
                                warn!(
                                    location_id = %split.location_id,
                                    error = %e,
                                    "location lookup failed"
                                );
                                PlanningError::ProviderFault(e.to_string())
                            })?;
                        resolved.insert(split.location_id, loc.clone());
                        loc
                    }
                };
                drafts.push(TaskDraft {
                    task_id: PickTaskId::generate(),
                    load_id: load.id_typed(),
                    order_id: alloc.order_id,
                    line_item_id: alloc.line_item_id,
                    product_id: alloc.product_id,
                    lot_id: split.lot_id,
                    location,
                    quantity: split.quantity,
                });
            }
        }
        Ok(drafts)
    }
}

/// Lot bookkeeping for one planning run.
///
/// Several line items may draw on the same lot; each provider snapshot is
/// reduced by what earlier line items already took, and the version first
/// seen for a lot is the one every later reservation must match.
#[derive(Debug, Default)]
struct RunLedger {
    consumed: HashMap<LotId, i64>,
    versions: HashMap<LotId, u64>,
    order: Vec<LotId>,
}

impl RunLedger {
    fn screen(
        &mut self,
        req: &LineItemRequirement,
        offered: Vec<Lot>,
        as_of: NaiveDate,
    ) -> Result<Vec<Lot>, PlanningError> {
        let mut lots = Vec::with_capacity(offered.len());
        let mut offered_ids = HashSet::with_capacity(offered.len());
        for mut lot in offered {
            if !offered_ids.insert(lot.lot_id) {
                error!(lot_id = %lot.lot_id, "provider returned the same lot twice");
                return Err(PlanningError::ContractViolation(format!(
                    "lot {} offered more than once for product {}",
                    lot.lot_id, req.product_id
                )));
            }
            if lot.product_id != req.product_id {
                error!(lot_id = %lot.lot_id, "provider returned a lot for another product");
                return Err(PlanningError::ContractViolation(format!(
                    "lot {} belongs to product {}, requested {}",
                    lot.lot_id, lot.product_id, req.product_id
                )));
            }
            if lot.is_expired(as_of) {
                error!(
                    lot_id = %lot.lot_id,
                    expires_at = ?lot.expires_at,
                    "provider returned an expired lot"
                );
                return Err(PlanningError::ContractViolation(format!(
                    "lot {} expired before {as_of}",
                    lot.lot_id
                )));
            }

            match self.versions.get(&lot.lot_id) {
                Some(seen) if *seen != lot.version => {
                    return Err(PlanningError::ConcurrentAllocationConflict {
                        lot_id: Some(lot.lot_id),
                        reason: format!(
                            "lot version moved from {seen} to {} during planning",
                            lot.version
                        ),
                    });
                }
                Some(_) => {}
                None => {
                    self.versions.insert(lot.lot_id, lot.version);
                }
            }

            let already = self.consumed.get(&lot.lot_id).copied().unwrap_or(0);
            lot.available_quantity = (lot.available_quantity - already).max(0);
            lots.push(lot);
        }
        Ok(lots)
    }

    fn consume(&mut self, lot_id: LotId, quantity: i64) {
        let entry = self.consumed.entry(lot_id).or_insert_with(|| {
            self.order.push(lot_id);
            0
        });
        *entry += quantity;
    }

    /// One reservation per lot, in first-allocated order.
    fn reservations(&self) -> Vec<LotReservation> {
        self.order
            .iter()
            .map(|lot_id| LotReservation {
                lot_id: *lot_id,
                quantity: self.consumed.get(lot_id).copied().unwrap_or(0),
                expected_version: ExpectedVersion::Exact(
                    self.versions.get(lot_id).copied().unwrap_or(0),
                ),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use forgewms_core::AggregateRoot;
    use forgewms_inventory::ProductId;

    use crate::ids::{LineItemId, LoadId, OrderId};
    use crate::load::{AssignOrder, CreateLoad, LoadLineItem, OrderPlanningStatus};
    use crate::proximity::ZoneDistanceScorer;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ctx() -> PlanningContext {
        PlanningContext {
            as_of: date(2025, 1, 15),
            occurred_at: Utc::now(),
        }
    }

    #[derive(Default)]
    struct FakeStock {
        lots: Vec<Lot>,
        fail: bool,
        /// Every lot looks one version newer from the second query on.
        bump_after_first_query: bool,
        queries: Mutex<Vec<ProductId>>,
    }

    impl AvailabilityProvider for FakeStock {
        fn query(
            &self,
            _tenant_id: TenantId,
            product_id: ProductId,
            _required_quantity: i64,
        ) -> Result<Vec<Lot>, crate::ports::ProviderError> {
            let seen = {
                let mut queries = self.queries.lock().unwrap();
                queries.push(product_id);
                queries.len()
            };
            if self.fail {
                return Err(crate::ports::ProviderError::Timeout("stock service".into()));
            }
            let bump = u64::from(self.bump_after_first_query && seen > 1);
            Ok(self
                .lots
                .iter()
                .filter(|l| l.product_id == product_id)
                .map(|l| l.clone().with_version(l.version + bump))
                .collect())
        }
    }

    #[derive(Default)]
    struct FakeLayout {
        locations: HashMap<LocationId, Location>,
    }

    impl LocationResolver for FakeLayout {
        fn location_of(
            &self,
            _tenant_id: TenantId,
            location_id: LocationId,
        ) -> Result<Location, crate::ports::ProviderError> {
            self.locations
                .get(&location_id)
                .cloned()
                .ok_or_else(|| crate::ports::ProviderError::NotFound(location_id.to_string()))
        }
    }

    #[derive(Default)]
    struct FakeLedger {
        reserved: Mutex<Vec<LotReservation>>,
        conflict: bool,
    }

    impl ReservationLedger for FakeLedger {
        fn reserve(
            &self,
            _tenant_id: TenantId,
            reservations: &[LotReservation],
        ) -> Result<(), ReservationError> {
            if self.conflict {
                return Err(ReservationError::Conflict {
                    lot_id: reservations[0].lot_id,
                    reason: "version moved".into(),
                });
            }
            self.reserved.lock().unwrap().extend_from_slice(reservations);
            Ok(())
        }

        fn release(
            &self,
            _tenant_id: TenantId,
            _reservations: &[LotReservation],
        ) -> Result<(), ReservationError> {
            Ok(())
        }
    }

    struct Warehouse {
        stock: FakeStock,
        layout: FakeLayout,
    }

    impl Warehouse {
        fn new() -> Self {
            Self {
                stock: FakeStock::default(),
                layout: FakeLayout::default(),
            }
        }

        fn lot(
            &mut self,
            product: ProductId,
            qty: i64,
            exp: Option<NaiveDate>,
            zone: &str,
            aisle: i32,
        ) -> Lot {
            let location = Location::new(LocationId::generate(), zone, aisle, 0, 0).unwrap();
            let lot =
                Lot::new(LotId::generate(), product, location.location_id, qty, exp).unwrap();
            self.layout.locations.insert(location.location_id, location);
            self.stock.lots.push(lot.clone());
            lot
        }

        fn orchestrator(
            self,
            ledger: FakeLedger,
        ) -> PlanningOrchestrator<FakeStock, FakeLayout, FakeLedger, ZoneDistanceScorer> {
            PlanningOrchestrator::new(
                self.stock,
                self.layout,
                ledger,
                ZoneDistanceScorer::default(),
            )
        }
    }

    fn pending_load(tenant_id: TenantId, orders: Vec<Vec<(ProductId, i64)>>) -> Load {
        let load_id = LoadId::generate();
        let mut load = Load::empty(load_id);
        let mut events = load
            .handle(&LoadCommand::CreateLoad(CreateLoad {
                tenant_id,
                load_id,
                occurred_at: Utc::now(),
            }))
            .unwrap();
        load.apply(&events.remove(0));
        for lines in orders {
            let cmd = LoadCommand::AssignOrder(AssignOrder {
                tenant_id,
                load_id,
                order_id: OrderId::generate(),
                lines: lines
                    .into_iter()
                    .map(|(product_id, quantity)| LoadLineItem {
                        line_item_id: LineItemId::generate(),
                        product_id,
                        quantity,
                    })
                    .collect(),
                occurred_at: Utc::now(),
            });
            for ev in load.handle(&cmd).unwrap() {
                load.apply(&ev);
            }
        }
        load
    }

    #[test]
    fn plans_fefo_splits_and_sequences_by_proximity() {
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let q = ProductId::generate();
        let mut wh = Warehouse::new();
        let l1 = wh.lot(p, 50, Some(date(2025, 2, 1)), "C", 5);
        let l2 = wh.lot(p, 100, Some(date(2025, 3, 1)), "B", 1);
        let l3 = wh.lot(q, 10, None, "A", 1);
        let load = pending_load(tenant, vec![vec![(p, 120)], vec![(q, 4)]]);
        let orch = wh.orchestrator(FakeLedger::default());

        let outcome = orch.plan(tenant, &load, &ctx()).unwrap();

        let p_splits: Vec<_> = outcome.allocations[0]
            .splits
            .iter()
            .map(|s| (s.lot_id, s.quantity))
            .collect();
        assert_eq!(p_splits, vec![(l1.lot_id, 50), (l2.lot_id, 70)]);

        // Zone A (q) first, then B (l2), then C (l1).
        let path: Vec<_> = outcome.tasks.iter().map(|t| (t.lot_id, t.sequence)).collect();
        assert_eq!(path, vec![(l3.lot_id, 1), (l2.lot_id, 2), (l1.lot_id, 3)]);

        assert_eq!(outcome.load.status(), LoadStatus::Planned);
        assert_eq!(outcome.load.version(), load.version() + 2);
        assert!(
            outcome
                .load
                .orders()
                .iter()
                .all(|o| o.status == OrderPlanningStatus::Planned)
        );
        assert_eq!(outcome.events.len(), 2);
        assert_eq!(orch.ledger().reserved.lock().unwrap().len(), 3);
    }

    #[test]
    fn collects_every_shortfall_and_reserves_nothing() {
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let q = ProductId::generate();
        let r = ProductId::generate();
        let mut wh = Warehouse::new();
        wh.lot(p, 50, Some(date(2025, 2, 1)), "A", 1);
        wh.lot(p, 100, Some(date(2025, 3, 1)), "A", 2);
        wh.lot(r, 5, None, "A", 1);
        let load = pending_load(tenant, vec![vec![(p, 200), (r, 5)], vec![(q, 1)]]);
        let orch = wh.orchestrator(FakeLedger::default());

        let err = orch.plan(tenant, &load, &ctx()).unwrap_err();

        let shortfalls = err.shortfalls();
        assert_eq!(shortfalls.len(), 2);
        assert_eq!(shortfalls[0].product_id, p);
        assert_eq!(shortfalls[0].required_quantity, 200);
        assert_eq!(shortfalls[0].total_available, 150);
        assert_eq!(shortfalls[1].product_id, q);
        assert_eq!(shortfalls[1].total_available, 0);
        assert!(orch.ledger().reserved.lock().unwrap().is_empty());
        assert_eq!(load.status(), LoadStatus::Pending);
    }

    #[test]
    fn planned_load_is_rejected_before_any_query() {
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let mut wh = Warehouse::new();
        wh.lot(p, 10, None, "A", 1);
        let load = pending_load(tenant, vec![vec![(p, 1)]]);
        let orch = wh.orchestrator(FakeLedger::default());
        let planned = orch.plan(tenant, &load, &ctx()).unwrap().load;
        orch.availability.queries.lock().unwrap().clear();

        let err = orch.plan(tenant, &planned, &ctx()).unwrap_err();

        assert_eq!(
            err,
            PlanningError::InvalidPlanState {
                load_id: planned.id_typed(),
                status: LoadStatus::Planned,
            }
        );
        assert!(orch.availability.queries.lock().unwrap().is_empty());
    }

    #[test]
    fn same_product_on_two_lines_does_not_overdraw_a_lot() {
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let mut wh = Warehouse::new();
        let a = wh.lot(p, 10, Some(date(2025, 2, 1)), "A", 1);
        let b = wh.lot(p, 10, Some(date(2025, 3, 1)), "A", 1);
        let load = pending_load(tenant, vec![vec![(p, 6)], vec![(p, 6)]]);
        let orch = wh.orchestrator(FakeLedger::default());

        let outcome = orch.plan(tenant, &load, &ctx()).unwrap();

        let second: Vec<_> = outcome.allocations[1]
            .splits
            .iter()
            .map(|s| (s.lot_id, s.quantity))
            .collect();
        assert_eq!(second, vec![(a.lot_id, 4), (b.lot_id, 2)]);

        let reserved = orch.ledger().reserved.lock().unwrap().clone();
        assert_eq!(reserved.len(), 2);
        assert_eq!(reserved[0].lot_id, a.lot_id);
        assert_eq!(reserved[0].quantity, 10);
        assert_eq!(reserved[1].quantity, 2);
    }

    #[test]
    fn expired_lot_from_provider_is_a_contract_violation() {
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let mut wh = Warehouse::new();
        wh.lot(p, 10, Some(date(2025, 1, 1)), "A", 1);
        let load = pending_load(tenant, vec![vec![(p, 1)]]);
        let orch = wh.orchestrator(FakeLedger::default());

        let err = orch.plan(tenant, &load, &ctx()).unwrap_err();
        assert!(matches!(err, PlanningError::ContractViolation(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn lot_offered_twice_in_one_answer_is_a_contract_violation() {
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let mut wh = Warehouse::new();
        let lot = wh.lot(p, 10, None, "A", 1);
        wh.stock.lots.push(lot);
        let load = pending_load(tenant, vec![vec![(p, 15)]]);
        let orch = wh.orchestrator(FakeLedger::default());

        let err = orch.plan(tenant, &load, &ctx()).unwrap_err();

        assert!(matches!(err, PlanningError::ContractViolation(_)));
        assert!(!err.is_retryable());
        assert!(orch.ledger().reserved.lock().unwrap().is_empty());
    }

    #[test]
    fn lot_version_moving_between_lines_is_a_conflict() {
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let mut wh = Warehouse::new();
        let lot = wh.lot(p, 10, None, "A", 1);
        wh.stock.bump_after_first_query = true;
        let load = pending_load(tenant, vec![vec![(p, 3), (p, 3)]]);
        let orch = wh.orchestrator(FakeLedger::default());

        let err = orch.plan(tenant, &load, &ctx()).unwrap_err();

        assert!(err.is_retryable());
        assert!(matches!(
            err,
            PlanningError::ConcurrentAllocationConflict { lot_id: Some(id), .. } if id == lot.lot_id
        ));
        assert_eq!(orch.availability.queries.lock().unwrap().len(), 2);
        assert!(orch.ledger().reserved.lock().unwrap().is_empty());
    }

    #[test]
    fn provider_timeout_aborts_without_reserving() {
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let mut wh = Warehouse::new();
        wh.stock.fail = true;
        let load = pending_load(tenant, vec![vec![(p, 1)]]);
        let orch = wh.orchestrator(FakeLedger::default());

        let err = orch.plan(tenant, &load, &ctx()).unwrap_err();
        assert!(matches!(err, PlanningError::ProviderFault(_)));
        assert!(orch.ledger().reserved.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_location_is_a_provider_fault() {
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let mut wh = Warehouse::new();
        wh.lot(p, 10, None, "A", 1);
        wh.layout.locations.clear();
        let load = pending_load(tenant, vec![vec![(p, 1)]]);
        let orch = wh.orchestrator(FakeLedger::default());

        assert!(matches!(
            orch.plan(tenant, &load, &ctx()),
            Err(PlanningError::ProviderFault(_))
        ));
    }

    #[test]
    fn ledger_conflict_is_retryable_and_leaves_load_pending() {
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let mut wh = Warehouse::new();
        let lot = wh.lot(p, 10, None, "A", 1);
        let load = pending_load(tenant, vec![vec![(p, 3)]]);
        let orch = wh.orchestrator(FakeLedger {
            conflict: true,
            ..FakeLedger::default()
        });

        let err = orch.plan(tenant, &load, &ctx()).unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(
            err,
            PlanningError::ConcurrentAllocationConflict { lot_id: Some(id), .. } if id == lot.lot_id
        ));
        assert_eq!(load.status(), LoadStatus::Pending);
    }

    #[test]
    fn wrong_tenant_is_rejected() {
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let load = pending_load(tenant, vec![vec![(p, 1)]]);
        let orch = Warehouse::new().orchestrator(FakeLedger::default());

        assert!(matches!(
            orch.plan(TenantId::new(), &load, &ctx()),
            Err(PlanningError::Domain(DomainError::InvariantViolation(_)))
        ));
    }
}
