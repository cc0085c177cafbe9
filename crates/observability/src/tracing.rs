//! Tracing/logging initialization.
//!
//! JSON lines with timestamps, filtered by `RUST_LOG`. Planning runs open a
//! `plan_load` span (tenant, load id), so every record of a run carries them.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Like `init`, with a caller-chosen fallback filter (e.g. `"forgewms_picking=debug"`).
pub fn init_with_default(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
