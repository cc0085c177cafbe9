use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use forgewms_core::DomainError;

use crate::ids::{LocationId, LotId, ProductId};

/// Snapshot of a stock lot as read at planning time.
///
/// `version` is the lot's ETag: it changes whenever the stock service updates
/// the lot, and reservations must present it back (compare-and-swap).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub lot_id: LotId,
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub available_quantity: i64,
    /// `None` means the lot never expires.
    pub expires_at: Option<NaiveDate>,
    pub version: u64,
}

impl Lot {
    pub fn new(
        lot_id: LotId,
        product_id: ProductId,
        location_id: LocationId,
        available_quantity: i64,
        expires_at: Option<NaiveDate>,
    ) -> Result<Self, DomainError> {
        if available_quantity < 0 {
            return Err(DomainError::validation("available_quantity cannot be negative"));
        }
        Ok(Self {
            lot_id,
            product_id,
            location_id,
            available_quantity,
            expires_at,
            version: 0,
        })
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// A lot is expired once its expiration date is strictly before `as_of`.
    /// A lot expiring today is still pickable today.
    pub fn is_expired(&self, as_of: NaiveDate) -> bool {
        matches!(self.expires_at, Some(exp) if exp < as_of)
    }
}
