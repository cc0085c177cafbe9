//! Planning failure taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use forgewms_core::DomainError;
use forgewms_inventory::{LotId, ProductId};

use crate::ids::{LineItemId, LoadId, OrderId};
use crate::load::{LineItemRequirement, LoadStatus};

/// A line item the available stock could not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineShortfall {
    pub order_id: OrderId,
    pub line_item_id: LineItemId,
    pub product_id: ProductId,
    pub required_quantity: i64,
    pub total_available: i64,
}

impl LineShortfall {
    pub fn new(requirement: &LineItemRequirement, total_available: i64) -> Self {
        Self {
            order_id: requirement.order_id,
            line_item_id: requirement.line_item_id,
            product_id: requirement.product_id,
            required_quantity: requirement.required_quantity,
            total_available,
        }
    }
}

/// Why a load could not be planned. Every variant leaves the load and the
/// stock untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanningError {
    /// Business fact: stock does not cover one or more line items.
    /// Lists every failing line item found in the run.
    #[error("insufficient stock for {} line item(s)", .0.len())]
    InsufficientStock(Vec<LineShortfall>),

    /// The load is not pending (e.g. planned already).
    #[error("load {load_id} cannot be planned from status {status:?}")]
    InvalidPlanState { load_id: LoadId, status: LoadStatus },

    /// Stock changed between read and commit. Retry with fresh availability.
    #[error("concurrent allocation conflict: {reason}")]
    ConcurrentAllocationConflict { lot_id: Option<LotId>, reason: String },

    /// Availability, location or reservation service failed (timeout,
    /// unreachable, unknown location).
    #[error("provider fault: {0}")]
    ProviderFault(String),

    /// A collaborator broke its contract (expired or foreign lot from the
    /// provider, non-positive requirement). A bug, not a business outcome.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl PlanningError {
    /// Only conflicts are worth retrying; insufficiency is a business fact.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlanningError::ConcurrentAllocationConflict { .. })
    }

    /// Shortfalls to present per product (empty for other variants).
    pub fn shortfalls(&self) -> &[LineShortfall] {
        match self {
            PlanningError::InsufficientStock(s) => s,
            _ => &[],
        }
    }
}
