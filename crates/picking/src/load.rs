use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forgewms_core::{Aggregate, AggregateRoot, DomainError, TenantId};
use forgewms_events::Event;
use forgewms_inventory::ProductId;

use crate::ids::{LineItemId, LoadId, OrderId};
use crate::task::{LineAllocation, PickTask};

/// Load planning lifecycle. `Planned` is terminal for this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Pending,
    Planned,
}

/// Per-order status inside a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderPlanningStatus {
    Awaiting,
    Planned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadLineItem {
    pub line_item_id: LineItemId,
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOrder {
    pub order_id: OrderId,
    pub lines: Vec<LoadLineItem>,
    pub status: OrderPlanningStatus,
}

/// What one line item needs from stock in this planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRequirement {
    pub order_id: OrderId,
    pub line_item_id: LineItemId,
    pub product_id: ProductId,
    pub required_quantity: i64,
}

/// Aggregate root: Load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Load {
    id: LoadId,
    tenant_id: Option<TenantId>,
    status: LoadStatus,
    orders: Vec<LoadOrder>,
    tasks: Vec<PickTask>,
    version: u64,
    created: bool,
}

impl Load {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: LoadId) -> Self {
        Self {
            id,
            tenant_id: None,
            status: LoadStatus::Pending,
            orders: Vec::new(),
            tasks: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> LoadId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn orders(&self) -> &[LoadOrder] {
        &self.orders
    }

    /// Sequenced pick tasks (empty until planned).
    pub fn tasks(&self) -> &[PickTask] {
        &self.tasks
    }

    /// Line items in deterministic load order: orders by assignment, lines as
    /// listed on the order.
    pub fn requirements(&self) -> Vec<LineItemRequirement> {
        self.orders
            .iter()
            .flat_map(|order| {
                order.lines.iter().map(move |line| LineItemRequirement {
                    order_id: order.order_id,
                    line_item_id: line.line_item_id,
                    product_id: line.product_id,
                    required_quantity: line.quantity,
                })
            })
            .collect()
    }
}

impl AggregateRoot for Load {
    type Id = LoadId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateLoad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLoad {
    pub tenant_id: TenantId,
    pub load_id: LoadId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AssignOrder (adds an order and its line items to a pending load).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignOrder {
    pub tenant_id: TenantId,
    pub load_id: LoadId,
    pub order_id: OrderId,
    pub lines: Vec<LoadLineItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: PlanLoad (records a finalized, sequenced plan).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLoad {
    pub tenant_id: TenantId,
    pub load_id: LoadId,
    pub allocations: Vec<LineAllocation>,
    pub tasks: Vec<PickTask>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadCommand {
    CreateLoad(CreateLoad),
    AssignOrder(AssignOrder),
    PlanLoad(PlanLoad),
}

/// Event: LoadCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadCreated {
    pub tenant_id: TenantId,
    pub load_id: LoadId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderAssigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAssigned {
    pub tenant_id: TenantId,
    pub load_id: LoadId,
    pub order_id: OrderId,
    pub lines: Vec<LoadLineItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LoadPlanned.
///
/// `allocations` is the order → line item → lot → quantity mapping consumed by
/// stock reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadPlanned {
    pub tenant_id: TenantId,
    pub load_id: LoadId,
    pub order_ids: Vec<OrderId>,
    pub allocations: Vec<LineAllocation>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PickTasksCreated (the full sequenced task list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickTasksCreated {
    pub tenant_id: TenantId,
    pub load_id: LoadId,
    pub tasks: Vec<PickTask>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadEvent {
    LoadCreated(LoadCreated),
    OrderAssigned(OrderAssigned),
    LoadPlanned(LoadPlanned),
    PickTasksCreated(PickTasksCreated),
}

impl Event for LoadEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LoadEvent::LoadCreated(_) => "picking.load.created",
            LoadEvent::OrderAssigned(_) => "picking.load.order_assigned",
            LoadEvent::LoadPlanned(_) => "picking.load.planned",
            LoadEvent::PickTasksCreated(_) => "picking.load.pick_tasks_created",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LoadEvent::LoadCreated(e) => e.occurred_at,
            LoadEvent::OrderAssigned(e) => e.occurred_at,
            LoadEvent::LoadPlanned(e) => e.occurred_at,
            LoadEvent::PickTasksCreated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Load {
    type Command = LoadCommand;
    type Event = LoadEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LoadEvent::LoadCreated(e) => {
                self.id = e.load_id;
                self.tenant_id = Some(e.tenant_id);
                self.status = LoadStatus::Pending;
                self.orders.clear();
                self.tasks.clear();
                self.created = true;
            }
            LoadEvent::OrderAssigned(e) => {
                self.orders.push(LoadOrder {
                    order_id: e.order_id,
                    lines: e.lines.clone(),
                    status: OrderPlanningStatus::Awaiting,
                });
            }
            LoadEvent::LoadPlanned(e) => {
                self.status = LoadStatus::Planned;
                for order in &mut self.orders {
                    if e.order_ids.contains(&order.order_id) {
                        order.status = OrderPlanningStatus::Planned;
                    }
                }
            }
            LoadEvent::PickTasksCreated(e) => {
                self.tasks = e.tasks.clone();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LoadCommand::CreateLoad(cmd) => self.handle_create(cmd),
            LoadCommand::AssignOrder(cmd) => self.handle_assign(cmd),
            LoadCommand::PlanLoad(cmd) => self.handle_plan(cmd),
        }
    }
}

impl Load {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_load_id(&self, load_id: LoadId) -> Result<(), DomainError> {
        if self.id != load_id {
            return Err(DomainError::invariant("load_id mismatch"));
        }
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), DomainError> {
        if self.status != LoadStatus::Pending {
            return Err(DomainError::conflict("load is already planned"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateLoad) -> Result<Vec<LoadEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("load already exists"));
        }
        Ok(vec![LoadEvent::LoadCreated(LoadCreated {
            tenant_id: cmd.tenant_id,
            load_id: cmd.load_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_assign(&self, cmd: &AssignOrder) -> Result<Vec<LoadEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_load_id(cmd.load_id)?;
        self.ensure_pending()?;

        if self.orders.iter().any(|o| o.order_id == cmd.order_id) {
            return Err(DomainError::conflict("order already assigned to this load"));
        }
        if cmd.lines.is_empty() {
            return Err(DomainError::validation("order must have at least one line item"));
        }
        let mut seen = HashSet::new();
        for line in &cmd.lines {
            if line.quantity <= 0 {
                return Err(DomainError::validation("line item quantity must be positive"));
            }
            if !seen.insert(line.line_item_id) {
                return Err(DomainError::validation("duplicate line item in order"));
            }
        }

        Ok(vec![LoadEvent::OrderAssigned(OrderAssigned {
            tenant_id: cmd.tenant_id,
            load_id: cmd.load_id,
            order_id: cmd.order_id,
            lines: cmd.lines.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_plan(&self, cmd: &PlanLoad) -> Result<Vec<LoadEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_load_id(cmd.load_id)?;
        self.ensure_pending()?;

        let requirements = self.requirements();
        if requirements.is_empty() {
            return Err(DomainError::validation("cannot plan a load without line items"));
        }
        check_allocations_cover(&requirements, &cmd.allocations)?;
        check_tasks_match(&cmd.allocations, &cmd.tasks)?;

        let order_ids = self.orders.iter().map(|o| o.order_id).collect();

        Ok(vec![
            LoadEvent::LoadPlanned(LoadPlanned {
                tenant_id: cmd.tenant_id,
                load_id: cmd.load_id,
                order_ids,
                allocations: cmd.allocations.clone(),
                occurred_at: cmd.occurred_at,
            }),
            LoadEvent::PickTasksCreated(PickTasksCreated {
                tenant_id: cmd.tenant_id,
                load_id: cmd.load_id,
                tasks: cmd.tasks.clone(),
                occurred_at: cmd.occurred_at,
            }),
        ])
    }
}

/// Every requirement has exactly one allocation whose splits sum to the
/// required quantity, and there are no allocations for unknown line items.
fn check_allocations_cover(
    requirements: &[LineItemRequirement],
    allocations: &[LineAllocation],
) -> Result<(), DomainError> {
    if requirements.len() != allocations.len() {
        return Err(DomainError::invariant(format!(
            "plan covers {} line items, load has {}",
            allocations.len(),
            requirements.len()
        )));
    }

    let by_line: HashMap<(OrderId, LineItemId), &LineAllocation> = allocations
        .iter()
        .map(|a| ((a.order_id, a.line_item_id), a))
        .collect();

    for req in requirements {
        let alloc = by_line
            .get(&(req.order_id, req.line_item_id))
            .ok_or_else(|| {
                DomainError::invariant(format!("line item {} has no allocation", req.line_item_id))
            })?;
        if alloc.product_id != req.product_id {
            return Err(DomainError::invariant(format!(
                "line item {} allocated for the wrong product",
                req.line_item_id
            )));
        }
        if alloc.splits.iter().any(|s| s.quantity <= 0) {
            return Err(DomainError::invariant("allocation split quantities must be positive"));
        }
        if alloc.allocated_quantity() != req.required_quantity {
            return Err(DomainError::invariant(format!(
                "line item {} allocated {} of {}",
                req.line_item_id,
                alloc.allocated_quantity(),
                req.required_quantity
            )));
        }
    }
    Ok(())
}

/// One task per split, sequence numbers exactly `1..=N`.
fn check_tasks_match(
    allocations: &[LineAllocation],
    tasks: &[PickTask],
) -> Result<(), DomainError> {
    let split_count: usize = allocations.iter().map(|a| a.splits.len()).sum();
    if tasks.len() != split_count {
        return Err(DomainError::invariant(format!(
            "{} pick tasks for {} allocation splits",
            tasks.len(),
            split_count
        )));
    }

    let mut sequences: Vec<u32> = tasks.iter().map(|t| t.sequence).collect();
    sequences.sort_unstable();
    let contiguous = sequences
        .iter()
        .zip(1u32..)
        .all(|(actual, expected)| *actual == expected);
    if !contiguous {
        return Err(DomainError::invariant(
            "pick task sequence numbers must be 1..N without gaps or repeats",
        ));
    }
    Ok(())
}
