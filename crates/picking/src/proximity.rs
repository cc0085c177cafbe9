//! Location proximity scoring.
//!
//! `ZoneDistanceScorer` is a cheap placeholder, not a distance metric: it
//! ranks zones by a fixed priority table and adds aisle/rack/level offsets.
//! Callers depend on `ProximityScorer` only, so a graph or TSP-based scorer
//! can replace it without touching the sequencer or the planner.

use std::collections::BTreeMap;
use std::sync::Arc;

use forgewms_inventory::Location;

/// Travel-cost ranking for a location. Lower is closer to the pick/ship area.
///
/// Implementations must be pure functions of the location's fields.
pub trait ProximityScorer: Send + Sync {
    fn score(&self, location: &Location) -> i64;
}

impl<S> ProximityScorer for Arc<S>
where
    S: ProximityScorer + ?Sized,
{
    fn score(&self, location: &Location) -> i64 {
        (**self).score(location)
    }
}

impl<S> ProximityScorer for &S
where
    S: ProximityScorer + ?Sized,
{
    fn score(&self, location: &Location) -> i64 {
        (**self).score(location)
    }
}

/// Zone code → priority tier (1 = best).
///
/// Codes are matched case-insensitively. Unknown zones get the worst known
/// tier plus one instead of an error, so newly introduced zones still plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonePriorityTable {
    priorities: BTreeMap<String, u32>,
}

impl ZonePriorityTable {
    /// A table with no zones (every zone scores as unknown, tier 1).
    pub fn empty() -> Self {
        Self {
            priorities: BTreeMap::new(),
        }
    }

    pub fn with_zone(mut self, code: impl AsRef<str>, priority: u32) -> Self {
        self.priorities
            .insert(code.as_ref().trim().to_ascii_uppercase(), priority);
        self
    }

    pub fn priority(&self, zone: &str) -> u32 {
        self.priorities
            .get(&zone.trim().to_ascii_uppercase())
            .copied()
            .unwrap_or_else(|| self.unknown_priority())
    }

    pub fn unknown_priority(&self) -> u32 {
        self.priorities.values().copied().max().unwrap_or(0) + 1
    }
}

impl Default for ZonePriorityTable {
    /// Named areas plus their single-letter codes: A/PICKING closest,
    /// D/RECEIVING furthest. Anything else is tier 5.
    fn default() -> Self {
        Self::empty()
            .with_zone("PICKING", 1)
            .with_zone("A", 1)
            .with_zone("BULK_STORAGE", 2)
            .with_zone("B", 2)
            .with_zone("OVERFLOW", 3)
            .with_zone("C", 3)
            .with_zone("RECEIVING", 4)
            .with_zone("D", 4)
    }
}

/// `zone_priority * 1000 + |aisle - reference| * 10 + |rack| + |level|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneDistanceScorer {
    zones: ZonePriorityTable,
    picking_aisle_reference: i32,
}

impl ZoneDistanceScorer {
    pub fn new(zones: ZonePriorityTable, picking_aisle_reference: i32) -> Self {
        Self {
            zones,
            picking_aisle_reference,
        }
    }

    pub fn picking_aisle_reference(&self) -> i32 {
        self.picking_aisle_reference
    }

    pub fn zones(&self) -> &ZonePriorityTable {
        &self.zones
    }
}

impl Default for ZoneDistanceScorer {
    fn default() -> Self {
        Self::new(ZonePriorityTable::default(), 1)
    }
}

impl ProximityScorer for ZoneDistanceScorer {
    fn score(&self, location: &Location) -> i64 {
        let zone = i64::from(self.zones.priority(&location.zone)) * 1000;
        let aisle =
            (i64::from(location.aisle) - i64::from(self.picking_aisle_reference)).abs() * 10;
        let slot = i64::from(location.rack).abs() + i64::from(location.level).abs();
        zone + aisle + slot
    }
}
