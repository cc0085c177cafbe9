use serde::{Deserialize, Serialize};

use forgewms_core::DomainError;

use crate::ids::LocationId;

/// Storage location reference data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub location_id: LocationId,
    /// Zone code ("A".."Z" or a named area such as "PICKING").
    pub zone: String,
    pub aisle: i32,
    pub rack: i32,
    pub level: i32,
}

impl Location {
    /// Validating factory. Zone codes are trimmed and upper-cased so lookups
    /// against zone tables are case-insensitive.
    pub fn new(
        location_id: LocationId,
        zone: impl AsRef<str>,
        aisle: i32,
        rack: i32,
        level: i32,
    ) -> Result<Self, DomainError> {
        let zone = zone.as_ref().trim().to_ascii_uppercase();
        if zone.is_empty() {
            return Err(DomainError::validation("zone code cannot be empty"));
        }
        Ok(Self {
            location_id,
            zone,
            aisle,
            rack,
            level,
        })
    }
}
