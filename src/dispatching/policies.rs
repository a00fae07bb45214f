//! Built-in dispatch policies.
//!
//! # Policies
//!
//! - **RoundBased**: `rounds = ceil((queue_ahead + 1) / fleet_capacity)`,
//!   `wait = (rounds - 1) * round_trip / speed`.
//! - **UnitWait**: `wait = queue_ahead * avg_round_trip / fleet_capacity`,
//!   where the average round trip is measured over pending deliveries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{DispatchContext, DispatchPolicy};

/// Whole-round dispatch.
///
/// Drivers leave together and come back together; an order rides in the
/// first round with room for it. Weather stretches every round trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundBased {
    /// Clear-weather round trip (minutes).
    pub round_trip_minutes: f64,
}

impl RoundBased {
    /// Creates the policy.
    pub fn new(round_trip_minutes: f64) -> Self {
        Self { round_trip_minutes }
    }

    /// Round trip under the context's weather.
    pub fn round_trip(&self, context: &DispatchContext) -> f64 {
        self.round_trip_minutes / context.speed_multiplier()
    }

    /// 1-based round this order rides in.
    pub fn round_of(&self, context: &DispatchContext) -> usize {
        let capacity = context.fleet_capacity.max(1) as usize;
        (context.queue_ahead + 1).div_ceil(capacity)
    }
}

impl DispatchPolicy for RoundBased {
    fn name(&self) -> &'static str {
        "round_based"
    }

    fn wait_minutes(&self, context: &DispatchContext) -> f64 {
        let rounds = self.round_of(context);
        ((rounds - 1) as f64 * self.round_trip(context)).max(0.0)
    }

    fn description(&self) -> &'static str {
        "Wait for every full fleet round ahead"
    }
}

/// Per-order share of the average round trip.
///
/// The average is taken over the deliveries currently pending:
/// `round_trip = 2 * one_way + stay`. With nothing pending the fallback
/// `fallback_round_trip_minutes + stay` is used. The result is floored at
/// `min_round_trip_minutes` so a run of short hops does not produce
/// implausibly fast turnarounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitWait {
    /// Hand-off time at the door (minutes).
    pub stay_minutes: f64,
    /// Round trip assumed with no pending deliveries, excluding stay.
    pub fallback_round_trip_minutes: f64,
    /// Lower bound on the average round trip.
    pub min_round_trip_minutes: f64,
}

impl UnitWait {
    /// Creates the policy.
    pub fn new(
        stay_minutes: f64,
        fallback_round_trip_minutes: f64,
        min_round_trip_minutes: f64,
    ) -> Self {
        Self {
            stay_minutes,
            fallback_round_trip_minutes,
            min_round_trip_minutes,
        }
    }

    /// Average round trip over the pending deliveries (minutes).
    pub fn average_round_trip(&self, context: &DispatchContext) -> f64 {
        let pending = &context.pending_one_way_minutes;
        let average = if pending.is_empty() {
            self.fallback_round_trip_minutes + self.stay_minutes
        } else {
            let total: f64 = pending
                .iter()
                .map(|one_way| one_way * 2.0 + self.stay_minutes)
                .sum();
            total / pending.len() as f64
        };
        average.max(self.min_round_trip_minutes)
    }
}

impl Default for UnitWait {
    fn default() -> Self {
        Self::new(5.0, 30.0, 19.0)
    }
}

impl DispatchPolicy for UnitWait {
    fn name(&self) -> &'static str {
        "unit_wait"
    }

    fn wait_minutes(&self, context: &DispatchContext) -> f64 {
        let unit_wait = self.average_round_trip(context) / context.fleet_capacity.max(1) as f64;
        context.queue_ahead as f64 * unit_wait
    }

    fn description(&self) -> &'static str {
        "Each order ahead costs a share of the average round trip"
    }
}

/// Serializable policy selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DispatchPolicyConfig {
    /// See [`RoundBased`].
    RoundBased {
        /// Clear-weather round trip (minutes).
        #[serde(default = "default_round_trip")]
        round_trip_minutes: f64,
    },
    /// See [`UnitWait`].
    UnitWait {
        /// Hand-off time at the door (minutes).
        #[serde(default = "default_stay")]
        stay_minutes: f64,
        /// Round trip with nothing pending, excluding stay (minutes).
        #[serde(default = "default_round_trip")]
        fallback_round_trip_minutes: f64,
        /// Lower bound on the average round trip (minutes).
        #[serde(default = "default_min_round_trip")]
        min_round_trip_minutes: f64,
    },
}

fn default_round_trip() -> f64 {
    30.0
}

fn default_stay() -> f64 {
    5.0
}

fn default_min_round_trip() -> f64 {
    19.0
}

impl Default for DispatchPolicyConfig {
    fn default() -> Self {
        DispatchPolicyConfig::RoundBased {
            round_trip_minutes: default_round_trip(),
        }
    }
}

impl DispatchPolicyConfig {
    /// Builds the selected policy.
    pub fn build(&self) -> Arc<dyn DispatchPolicy> {
        match *self {
            DispatchPolicyConfig::RoundBased { round_trip_minutes } => {
                Arc::new(RoundBased::new(round_trip_minutes))
            }
            DispatchPolicyConfig::UnitWait {
                stay_minutes,
                fallback_round_trip_minutes,
                min_round_trip_minutes,
            } => Arc::new(UnitWait::new(
                stay_minutes,
                fallback_round_trip_minutes,
                min_round_trip_minutes,
            )),
        }
    }
}
