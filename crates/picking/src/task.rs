use serde::{Deserialize, Serialize};

use forgewms_inventory::{Location, LocationId, LotId, ProductId};

use crate::allocator::AllocationSplit;
use crate::ids::{LineItemId, LoadId, OrderId, PickTaskId};

/// The splits chosen for one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAllocation {
    pub order_id: OrderId,
    pub line_item_id: LineItemId,
    pub product_id: ProductId,
    pub splits: Vec<AllocationSplit>,
}

impl LineAllocation {
    pub fn allocated_quantity(&self) -> i64 {
        self.splits.iter().map(|s| s.quantity).sum()
    }
}

/// A pick task before sequencing; carries the resolved location so the
/// sequencer can score it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub task_id: PickTaskId,
    pub load_id: LoadId,
    pub order_id: OrderId,
    pub line_item_id: LineItemId,
    pub product_id: ProductId,
    pub lot_id: LotId,
    pub location: Location,
    pub quantity: i64,
}

/// One instruction: take `quantity` of `product_id` from `lot_id` at
/// `location_id`, as step `sequence` of the load's pick path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickTask {
    pub task_id: PickTaskId,
    pub load_id: LoadId,
    pub order_id: OrderId,
    pub line_item_id: LineItemId,
    pub product_id: ProductId,
    pub lot_id: LotId,
    pub location_id: LocationId,
    pub quantity: i64,
    /// 1-based position in the load's pick path.
    pub sequence: u32,
}

impl TaskDraft {
    pub fn into_task(self, sequence: u32) -> PickTask {
        PickTask {
            task_id: self.task_id,
            load_id: self.load_id,
            order_id: self.order_id,
            line_item_id: self.line_item_id,
            product_id: self.product_id,
            lot_id: self.lot_id,
            location_id: self.location.location_id,
            quantity: self.quantity,
            sequence,
        }
    }
}
