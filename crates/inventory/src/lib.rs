//! Inventory reference data consumed by warehouse planning.
//!
//! Lots and locations are owned by the stock and layout services; planning
//! only reads snapshots of them. Everything here is plain data plus
//! validating constructors (no IO, no storage).

pub mod ids;
pub mod location;
pub mod lot;

pub use ids::{LocationId, LotId, ProductId};
pub use location::Location;
pub use lot::Lot;
