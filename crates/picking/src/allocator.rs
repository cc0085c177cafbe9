//! FEFO allocation: decide which lots cover one line item.
//!
//! Lots are consumed earliest-expiring first; lots without an expiration date
//! go last. Among lots expiring on the same day the provider's order is kept
//! (the provider pre-sorts by location proximity), so the sort must be stable.
//!
//! The allocator is all-or-nothing: it returns a full cover or an error, never
//! a partial list of splits.

use core::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use forgewms_inventory::{LocationId, Lot, LotId, ProductId};

/// Quantity drawn from one lot for one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSplit {
    pub lot_id: LotId,
    pub location_id: LocationId,
    pub quantity: i64,
    pub expires_at: Option<NaiveDate>,
}

/// Unmet requirement for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub product_id: ProductId,
    pub required_quantity: i64,
    pub total_available: i64,
}

impl Shortfall {
    pub fn missing_quantity(&self) -> i64 {
        self.required_quantity - self.total_available
    }
}

impl core::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "product {}: required {}, available {}",
            self.product_id, self.required_quantity, self.total_available
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The candidate lots cannot cover the requirement.
    #[error("insufficient stock for {0}")]
    InsufficientStock(Shortfall),

    /// Caller passed a zero or negative requirement.
    #[error("required quantity must be positive (got {0})")]
    NonPositiveRequirement(i64),
}

/// FEFO comparison: earlier expiration first, never-expiring lots last.
pub fn fefo_order(a: &Lot, b: &Lot) -> Ordering {
    match (a.expires_at, b.expires_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Allocate `required_quantity` of `product_id` from `lots`.
///
/// The lots are expected to already belong to `product_id`; the planner
/// screens them before calling in here. Lots with nothing available are
/// skipped. Output is deterministic for identical input.
pub fn allocate(
    product_id: ProductId,
    required_quantity: i64,
    lots: &[Lot],
) -> Result<Vec<AllocationSplit>, AllocationError> {
    if required_quantity <= 0 {
        return Err(AllocationError::NonPositiveRequirement(required_quantity));
    }

    let mut sorted: Vec<&Lot> = lots.iter().collect();
    // `sort_by` is stable: equal expirations keep provider order.
    sorted.sort_by(|a, b| fefo_order(a, b));

    let mut remaining = required_quantity;
    let mut splits = Vec::new();
    for lot in sorted {
        if remaining == 0 {
            break;
        }
        let take = lot.available_quantity.min(remaining);
        if take <= 0 {
            continue;
        }
        splits.push(AllocationSplit {
            lot_id: lot.lot_id,
            location_id: lot.location_id,
            quantity: take,
            expires_at: lot.expires_at,
        });
        remaining -= take;
    }

    if remaining > 0 {
        let total_available = lots
            .iter()
            .map(|l| l.available_quantity.max(0))
            .fold(0i64, i64::saturating_add);
        return Err(AllocationError::InsufficientStock(Shortfall {
            product_id,
            required_quantity,
            total_available,
        }));
    }

    Ok(splits)
}
