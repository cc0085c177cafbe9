//! In-memory warehouse layout (location reference data).

use std::collections::HashMap;
use std::sync::RwLock;

use forgewms_core::TenantId;
use forgewms_inventory::{Location, LocationId};
use forgewms_picking::{LocationResolver, ProviderError};

#[derive(Debug, Default)]
pub struct InMemoryLocationDirectory {
    locations: RwLock<HashMap<(TenantId, LocationId), Location>>,
}

impl InMemoryLocationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a location for a tenant.
    pub fn insert(&self, tenant_id: TenantId, location: Location) -> Result<(), ProviderError> {
        let mut locations = self
            .locations
            .write()
            .map_err(|_| {
                ProviderError::Unavailable("location directory lock poisoned".to_string())
            })?;
        locations.insert((tenant_id, location.location_id), location);
        Ok(())
    }
}

impl LocationResolver for InMemoryLocationDirectory {
    fn location_of(
        &self,
        tenant_id: TenantId,
        location_id: LocationId,
    ) -> Result<Location, ProviderError> {
        let locations = self
            .locations
            .read()
            .map_err(|_| {
                ProviderError::Unavailable("location directory lock poisoned".to_string())
            })?;
        locations
            .get(&(tenant_id, location_id))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("location {location_id}")))
    }
}
