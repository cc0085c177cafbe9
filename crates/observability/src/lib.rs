//! Process-wide tracing setup shared by services embedding the planner.

/// Install the JSON tracing subscriber (`RUST_LOG`, default `info`).
///
/// Safe to call more than once; only the first call installs anything.
pub fn init() {
    tracing::init();
}

/// Subscriber construction (filters, JSON layer).
pub mod tracing;

pub use crate::tracing::{DEFAULT_FILTER, init_with_default};
