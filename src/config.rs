//! Simulator configuration.
//!
//! Loaded once per process (usually from TOML) and read-only afterwards.
//! Every field has a default, so an empty document is a valid config:
//!
//! ```toml
//! [kitchen]
//! ovens = 2
//! bake_minutes = 6.5
//! prep_minutes = 15.0
//!
//! [delivery]
//! base_speed_kmh = 40.0
//! weather = "rain"
//!
//! [delivery.drivers]
//! mode = "fixed"
//! count = 3
//!
//! [delivery.policy]
//! mode = "round_based"
//! round_trip_minutes = 30.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dispatching::DispatchPolicyConfig;
use crate::error::{EtaError, EtaResult};
use crate::models::{DriverSource, LocationTable, UnknownLocationPolicy, WeatherTable};
use crate::time::MinuteRounding;

/// Kitchen parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitchenConfig {
    /// Oven slots. Values below 1 are treated as 1.
    pub ovens: i64,
    /// Minutes a unit spends in the oven.
    pub bake_minutes: f64,
    /// Minutes of prep before a unit may enter an oven.
    pub prep_minutes: f64,
    /// Minimum minutes between two units entering the same slot.
    pub oven_interval_minutes: f64,
    /// Minutes before a reservation's target at which it joins the queue.
    pub look_ahead_minutes: f64,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            ovens: 2,
            bake_minutes: 6.5,
            prep_minutes: 15.0,
            oven_interval_minutes: 1.0,
            look_ahead_minutes: 30.0,
        }
    }
}

impl KitchenConfig {
    /// Oven count, or `InvalidCapacity` when it is below 1.
    pub fn checked_ovens(&self) -> EtaResult<usize> {
        usize::try_from(self.ovens)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or(EtaError::InvalidCapacity {
                what: "oven count",
                value: self.ovens,
            })
    }

    /// Oven count clamped to at least 1.
    pub fn effective_ovens(&self) -> usize {
        self.checked_ovens().unwrap_or_else(|err| {
            warn!(%err, "using a single oven");
            1
        })
    }
}

/// Delivery fleet parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Clear-weather average driving speed (km/h).
    pub base_speed_kmh: f64,
    /// Units one driver carries per trip in clear weather.
    pub base_stack: u32,
    /// Driver count source.
    pub drivers: DriverSource,
    /// Dispatch wait policy.
    pub policy: DispatchPolicyConfig,
    /// Handling of destinations missing from the location table.
    pub unknown_location: UnknownLocationPolicy,
    /// Current weather condition (key into the weather table).
    pub weather: String,
    /// How result offsets become minutes.
    pub rounding: MinuteRounding,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            base_speed_kmh: 40.0,
            base_stack: 3,
            drivers: DriverSource::default(),
            policy: DispatchPolicyConfig::default(),
            unknown_location: UnknownLocationPolicy::default(),
            weather: "clear".to_string(),
            rounding: MinuteRounding::Floor,
        }
    }
}

/// Complete simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EtaConfig {
    /// Kitchen parameters.
    pub kitchen: KitchenConfig,
    /// Delivery parameters.
    pub delivery: DeliveryConfig,
    /// Zones and locations.
    pub area: LocationTable,
    /// Weather profiles by condition.
    pub weather_profiles: WeatherTable,
}

impl EtaConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> EtaResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> EtaResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Sets the oven count.
    pub fn with_ovens(mut self, ovens: i64) -> Self {
        self.kitchen.ovens = ovens;
        self
    }

    /// Sets the current weather condition.
    pub fn with_weather(mut self, weather: impl Into<String>) -> Self {
        self.delivery.weather = weather.into();
        self
    }

    /// Sets the driver source.
    pub fn with_drivers(mut self, drivers: DriverSource) -> Self {
        self.delivery.drivers = drivers;
        self
    }

    /// Sets the dispatch policy.
    pub fn with_policy(mut self, policy: DispatchPolicyConfig) -> Self {
        self.delivery.policy = policy;
        self
    }
}
