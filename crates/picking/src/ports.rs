//! Boundaries to the services planning depends on.
//!
//! Stock availability, warehouse layout and lot reservation are owned by
//! other services. Transport, caching, timeouts and circuit breaking live in
//! the adapters behind these traits; planning only sees the results.

use std::sync::Arc;

use thiserror::Error;

use forgewms_core::{ExpectedVersion, TenantId};
use forgewms_inventory::{Location, LocationId, Lot, LotId, ProductId};

/// Failure reported by an availability or location adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider timed out: {0}")]
    Timeout(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Candidate lots for a product.
///
/// Must return only lots that are not expired, not blocked and available for
/// allocation. FEFO order is not required (the allocator sorts), but results
/// should be pre-sorted by location proximity: that order is the tie-break
/// between lots expiring on the same day.
pub trait AvailabilityProvider: Send + Sync {
    fn query(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        required_quantity: i64,
    ) -> Result<Vec<Lot>, ProviderError>;
}

/// Location reference data lookup.
pub trait LocationResolver: Send + Sync {
    fn location_of(
        &self,
        tenant_id: TenantId,
        location_id: LocationId,
    ) -> Result<Location, ProviderError>;
}

/// Decrement of one lot, conditional on the lot still being at the version
/// the plan read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotReservation {
    pub lot_id: LotId,
    pub quantity: i64,
    pub expected_version: ExpectedVersion,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// The lot changed (or lost stock) since it was read.
    #[error("lot {lot_id} changed since it was read: {reason}")]
    Conflict { lot_id: LotId, reason: String },

    #[error("reservation ledger unavailable: {0}")]
    Unavailable(String),
}

/// Compare-and-swap lot decrements.
///
/// `reserve` applies every reservation or none of them. `release` undoes a
/// successful `reserve` (compensation when a later commit step fails).
pub trait ReservationLedger: Send + Sync {
    fn reserve(
        &self,
        tenant_id: TenantId,
        reservations: &[LotReservation],
    ) -> Result<(), ReservationError>;

    fn release(
        &self,
        tenant_id: TenantId,
        reservations: &[LotReservation],
    ) -> Result<(), ReservationError>;
}

impl<P> AvailabilityProvider for Arc<P>
where
    P: AvailabilityProvider + ?Sized,
{
    fn query(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        required_quantity: i64,
    ) -> Result<Vec<Lot>, ProviderError> {
        (**self).query(tenant_id, product_id, required_quantity)
    }
}

impl<R> LocationResolver for Arc<R>
where
    R: LocationResolver + ?Sized,
{
    fn location_of(
        &self,
        tenant_id: TenantId,
        location_id: LocationId,
    ) -> Result<Location, ProviderError> {
        (**self).location_of(tenant_id, location_id)
    }
}

impl<L> ReservationLedger for Arc<L>
where
    L: ReservationLedger + ?Sized,
{
    fn reserve(
        &self,
        tenant_id: TenantId,
        reservations: &[LotReservation],
    ) -> Result<(), ReservationError> {
        (**self).reserve(tenant_id, reservations)
    }

    fn release(
        &self,
        tenant_id: TenantId,
        reservations: &[LotReservation],
    ) -> Result<(), ReservationError> {
        (**self).release(tenant_id, reservations)
    }
}
