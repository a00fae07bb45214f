//! Weather profiles.
//!
//! Bad weather slows drivers down and limits how many boxes one driver can
//! safely carry per trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EtaError, EtaResult};

/// Effect of one weather condition on delivery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherProfile {
    /// Multiplier on travel speed and round-trip pace (1.0 = clear).
    pub speed_multiplier: f64,
    /// Multiplier on units per driver per trip (1.0 = clear).
    pub stack_multiplier: f64,
}

impl WeatherProfile {
    /// Creates a profile.
    pub fn new(speed_multiplier: f64, stack_multiplier: f64) -> Self {
        Self {
            speed_multiplier,
            stack_multiplier,
        }
    }

    /// Neutral profile.
    pub fn clear() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Weather profiles by condition name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherTable(pub BTreeMap<String, WeatherProfile>);

impl WeatherTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a profile.
    pub fn with_profile(mut self, name: impl Into<String>, profile: WeatherProfile) -> Self {
        self.0.insert(name.into(), profile);
        self
    }

    /// Looks up a condition.
    pub fn profile(&self, name: &str) -> EtaResult<WeatherProfile> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| EtaError::UnknownWeather(name.to_string()))
    }

    /// Known condition names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Default for WeatherTable {
    fn default() -> Self {
        Self::new()
            .with_profile("clear", WeatherProfile::clear())
            .with_profile("rain", WeatherProfile::new(0.8, 0.8))
            .with_profile("snow", WeatherProfile::new(0.6, 0.6))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles() {
        let table = WeatherTable::default();
        let rain = table.profile("rain").unwrap();
        assert!((rain.speed_multiplier - 0.8).abs() < 1e-10);
        assert!((rain.stack_multiplier - 0.8).abs() < 1e-10);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["clear", "rain", "snow"]);
    }

    #[test]
    fn test_unknown_weather() {
        let err = WeatherTable::default().profile("hail").unwrap_err();
        assert!(matches!(err, EtaError::UnknownWeather(ref n) if n == "hail"));
    }
}
