//! Environment-driven planning configuration.
//!
//! | variable                            | default |
//! |-------------------------------------|---------|
//! | `FORGEWMS_PICKING_AISLE_REFERENCE`  | 1       |
//! | `FORGEWMS_PLAN_MAX_ATTEMPTS`        | 3       |
//! | `FORGEWMS_PLAN_RETRY_BASE_DELAY_MS` | 50      |

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use forgewms_picking::{ZoneDistanceScorer, ZonePriorityTable};

use crate::retry::RetryPolicy;

pub const AISLE_REFERENCE_VAR: &str = "FORGEWMS_PICKING_AISLE_REFERENCE";
pub const MAX_ATTEMPTS_VAR: &str = "FORGEWMS_PLAN_MAX_ATTEMPTS";
pub const RETRY_BASE_DELAY_VAR: &str = "FORGEWMS_PLAN_RETRY_BASE_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningConfig {
    /// Aisle the picking path starts from.
    pub picking_aisle_reference: i32,
    /// Retries after a concurrent allocation conflict.
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            picking_aisle_reference: 1,
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(50),
        }
    }
}

impl PlanningConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source (tests pass a map instead of the
    /// process environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            picking_aisle_reference: parse_or(
                &lookup,
                AISLE_REFERENCE_VAR,
                defaults.picking_aisle_reference,
            )?,
            max_attempts: parse_or(&lookup, MAX_ATTEMPTS_VAR, defaults.max_attempts)?,
            retry_base_delay: parse_or(
                &lookup,
                RETRY_BASE_DELAY_VAR,
                defaults.retry_base_delay.as_millis() as u64,
            )
            .map(Duration::from_millis)?,
        })
    }

    /// Proximity scorer with the default zone table.
    pub fn scorer(&self) -> ZoneDistanceScorer {
        ZoneDistanceScorer::new(ZonePriorityTable::default(), self.picking_aisle_reference)
    }

    /// Exponential backoff capped at 20x the base delay.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(
            self.max_attempts,
            self.retry_base_delay,
            self.retry_base_delay.saturating_mul(20),
        )
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        _ => Ok(default),
    }
}
