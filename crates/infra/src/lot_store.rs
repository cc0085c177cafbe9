//! In-memory stock lots: availability provider + compare-and-swap ledger.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use forgewms_core::TenantId;
use forgewms_inventory::{Lot, LotId, ProductId};
use forgewms_picking::{
    AvailabilityProvider, LotReservation, ProviderError, ReservationError, ReservationLedger,
};

/// A lot as the stock service holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockedLot {
    pub lot: Lot,
    pub blocked: bool,
}

/// Tenant-partitioned lot table for tests/dev.
///
/// Lots are returned in insertion order, which callers use as the location
/// proximity hint. Every write bumps the lot's version.
#[derive(Debug, Default)]
pub struct InMemoryLotStore {
    lots: RwLock<HashMap<TenantId, Vec<StockedLot>>>,
    as_of: Option<NaiveDate>,
}

impl InMemoryLotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the date used to exclude expired lots (defaults to today, UTC).
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    fn today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Insert a lot, or replace it (bumping its version) if it already exists.
    pub fn put(&self, tenant_id: TenantId, lot: Lot) -> Result<(), ProviderError> {
        let mut tables = self.write()?;
        let table = tables.entry(tenant_id).or_default();
        match table.iter_mut().find(|s| s.lot.lot_id == lot.lot_id) {
            Some(existing) => {
                let version = existing.lot.version + 1;
                existing.lot = lot.with_version(version);
            }
            None => table.push(StockedLot {
                lot,
                blocked: false,
            }),
        }
        Ok(())
    }

    /// Block or unblock a lot (quality hold). Blocked lots are never offered.
    pub fn set_blocked(
        &self,
        tenant_id: TenantId,
        lot_id: LotId,
        blocked: bool,
    ) -> Result<(), ProviderError> {
        self.update(tenant_id, lot_id, |s| s.blocked = blocked)
    }

    /// Change available stock outside of planning (receipts, corrections,
    /// another service's reservation).
    pub fn adjust(
        &self,
        tenant_id: TenantId,
        lot_id: LotId,
        delta: i64,
    ) -> Result<(), ProviderError> {
        self.update(tenant_id, lot_id, |s| {
            s.lot.available_quantity = (s.lot.available_quantity + delta).max(0);
        })
    }

    pub fn get(&self, tenant_id: TenantId, lot_id: LotId) -> Option<Lot> {
        let tables = self.lots.read().ok()?;
        tables
            .get(&tenant_id)?
            .iter()
            .find(|s| s.lot.lot_id == lot_id)
            .map(|s| s.lot.clone())
    }

    fn update(
        &self,
        tenant_id: TenantId,
        lot_id: LotId,
        f: impl FnOnce(&mut StockedLot),
    ) -> Result<(), ProviderError> {
        let mut tables = self.write()?;
        let stocked = tables
            .get_mut(&tenant_id)
            .and_then(|t| t.iter_mut().find(|s| s.lot.lot_id == lot_id))
            .ok_or_else(|| ProviderError::NotFound(format!("lot {lot_id}")))?;
        f(stocked);
        stocked.lot.version += 1;
        Ok(())
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<TenantId, Vec<StockedLot>>>, ProviderError>
    {
        self.lots
            .write()
            .map_err(|_| ProviderError::Unavailable("lot store lock poisoned".to_string()))
    }
}

impl AvailabilityProvider for InMemoryLotStore {
    fn query(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        _required_quantity: i64,
    ) -> Result<Vec<Lot>, ProviderError> {
        let today = self.today();
        let tables = self
            .lots
            .read()
            .map_err(|_| ProviderError::Unavailable("lot store lock poisoned".to_string()))?;

        Ok(tables
            .get(&tenant_id)
            .map(|table| {
                table
                    .iter()
                    .filter(|s| {
                        s.lot.product_id == product_id
                            && !s.blocked
                            && s.lot.available_quantity > 0
                            && !s.lot.is_expired(today)
                    })
                    .map(|s| s.lot.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl ReservationLedger for InMemoryLotStore {
    fn reserve(
        &self,
        tenant_id: TenantId,
        reservations: &[LotReservation],
    ) -> Result<(), ReservationError> {
        let mut tables = self
            .lots
            .write()
            .map_err(|_| ReservationError::Unavailable("lot store lock poisoned".to_string()))?;
        let table = tables.entry(tenant_id).or_default();

        // Check everything first; nothing is written unless all checks pass.
        let mut positions = Vec::with_capacity(reservations.len());
        for r in reservations {
            let conflict = |reason: String| ReservationError::Conflict {
                lot_id: r.lot_id,
                reason,
            };
            if r.quantity <= 0 {
                return Err(conflict(format!("invalid reservation quantity {}", r.quantity)));
            }
            let pos = table
                .iter()
                .position(|s| s.lot.lot_id == r.lot_id)
                .ok_or_else(|| conflict("lot no longer exists".to_string()))?;
            let lot = &table[pos].lot;
            if !r.expected_version.matches(lot.version) {
                return Err(conflict(format!(
                    "expected {:?}, found version {}",
                    r.expected_version, lot.version
                )));
            }
            if lot.available_quantity < r.quantity {
                return Err(conflict(format!(
                    "only {} available, {} requested",
                    lot.available_quantity, r.quantity
                )));
            }
            positions.push(pos);
        }

        for (r, pos) in reservations.iter().zip(positions) {
            let lot = &mut table[pos].lot;
            lot.available_quantity -= r.quantity;
            lot.version += 1;
        }
        debug!(%tenant_id, lots = reservations.len(), "lots reserved");
        Ok(())
    }

    fn release(
        &self,
        tenant_id: TenantId,
        reservations: &[LotReservation],
    ) -> Result<(), ReservationError> {
        let mut tables = self
            .lots
            .write()
            .map_err(|_| ReservationError::Unavailable("lot store lock poisoned".to_string()))?;
        let table = tables.entry(tenant_id).or_default();

        for r in reservations {
            if let Some(stocked) = table.iter_mut().find(|s| s.lot.lot_id == r.lot_id) {
                stocked.lot.available_quantity += r.quantity;
                stocked.lot.version += 1;
            }
        }
        debug!(%tenant_id, lots = reservations.len(), "lot reservations released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgewms_core::ExpectedVersion;
    use forgewms_inventory::LocationId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lot(product_id: ProductId, qty: i64, exp: Option<NaiveDate>) -> Lot {
        Lot::new(LotId::generate(), product_id, LocationId::generate(), qty, exp).unwrap()
    }

    fn reservation(lot: &Lot, quantity: i64) -> LotReservation {
        LotReservation {
            lot_id: lot.lot_id,
            quantity,
            expected_version: ExpectedVersion::Exact(lot.version),
        }
    }

    #[test]
    fn query_excludes_expired_blocked_empty_and_foreign_lots() {
        let store = InMemoryLotStore::new().with_as_of(date(2025, 1, 15));
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let good = lot(p, 5, Some(date(2025, 1, 15)));
        let expired = lot(p, 5, Some(date(2025, 1, 14)));
        let blocked = lot(p, 5, None);
        let empty = lot(p, 0, None);
        let other = lot(ProductId::generate(), 5, None);
        for l in [&good, &expired, &blocked, &empty, &other] {
            store.put(tenant, l.clone()).unwrap();
        }
        store.set_blocked(tenant, blocked.lot_id, true).unwrap();
        store.put(TenantId::new(), lot(p, 9, None)).unwrap();

        let offered = store.query(tenant, p, 1).unwrap();
        assert_eq!(offered.len(), 1);
        assert_eq!(offered[0].lot_id, good.lot_id);
    }

    #[test]
    fn reserve_decrements_and_bumps_versions() {
        let store = InMemoryLotStore::new();
        let tenant = TenantId::new();
        let l = lot(ProductId::generate(), 10, None);
        store.put(tenant, l.clone()).unwrap();

        store.reserve(tenant, &[reservation(&l, 4)]).unwrap();

        let after = store.get(tenant, l.lot_id).unwrap();
        assert_eq!(after.available_quantity, 6);
        assert_eq!(after.version, l.version + 1);
    }

    #[test]
    fn stale_version_fails_the_whole_batch() {
        let store = InMemoryLotStore::new();
        let tenant = TenantId::new();
        let p = ProductId::generate();
        let a = lot(p, 10, None);
        let b = lot(p, 10, None);
        store.put(tenant, a.clone()).unwrap();
        store.put(tenant, b.clone()).unwrap();
        store.adjust(tenant, b.lot_id, -1).unwrap();

        let err = store
            .reserve(tenant, &[reservation(&a, 2), reservation(&b, 2)])
            .unwrap_err();

        assert!(matches!(err, ReservationError::Conflict { lot_id, .. } if lot_id == b.lot_id));
        assert_eq!(store.get(tenant, a.lot_id).unwrap().available_quantity, 10);
        assert_eq!(store.get(tenant, b.lot_id).unwrap().available_quantity, 9);
    }

    #[test]
    fn release_restores_quantity() {
        let store = InMemoryLotStore::new();
        let tenant = TenantId::new();
        let l = lot(ProductId::generate(), 10, None);
        store.put(tenant, l.clone()).unwrap();
        let r = reservation(&l, 7);

        store.reserve(tenant, std::slice::from_ref(&r)).unwrap();
        store.release(tenant, &[r]).unwrap();

        assert_eq!(store.get(tenant, l.lot_id).unwrap().available_quantity, 10);
    }
}
