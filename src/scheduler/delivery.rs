//! Delivery estimator.
//!
//! Given when a delivery comes out of the oven, estimates how long it waits
//! for a driver and how long the drive takes.
//!
//! # Model
//! - `travel = distance / (base_speed * weather.speed * zone.speed_factor) * 60`
//! - `per_driver = max(1, floor(base_stack * weather.stack))`
//! - `fleet = max(1, drivers * per_driver)`
//! - dispatch wait comes from the configured [`DispatchPolicy`].
//!
//! The customer-visible arrival excludes the driver's hand-off time at the
//! door; stay time only feeds round-trip averages.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::EtaConfig;
use crate::dispatching::{DispatchContext, DispatchPolicy};
use crate::error::EtaResult;
use crate::models::{
    DriverSupply, LocationTable, ResolvedLocation, UnknownLocationPolicy, WeatherProfile,
};
use crate::time::MinuteRounding;

/// Slowest effective driving speed honored (km/h).
pub const MIN_SPEED_KMH: f64 = 1.0;

/// Units one driver carries per trip under the given weather (≥ 1).
pub fn per_driver_capacity(base_stack: u32, weather: &WeatherProfile) -> u32 {
    let stacked = (f64::from(base_stack) * weather.stack_multiplier).floor();
    if stacked.is_finite() && stacked >= 1.0 {
        stacked as u32
    } else {
        1
    }
}

/// Units the whole fleet carries per round trip (≥ 1).
pub fn fleet_capacity(drivers: u32, per_driver: u32) -> u32 {
    drivers.saturating_mul(per_driver).max(1)
}

/// One-way drive time in minutes.
pub fn travel_minutes(distance_km: f64, base_speed_kmh: f64, speed_multiplier: f64) -> f64 {
    let speed = (base_speed_kmh * speed_multiplier).max(MIN_SPEED_KMH);
    distance_km.max(0.0) / speed * 60.0
}

/// Dispatch and travel breakdown for one delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryBreakdown {
    /// Destination name.
    pub location: String,
    /// Zone label, when the destination belongs to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// One-way distance (km).
    pub distance_km: f64,
    /// Drivers on the road when the pizzas came out of the oven.
    pub drivers: u32,
    /// Units the fleet carries per round trip.
    pub fleet_capacity: u32,
    /// Deliveries queued ahead of this one.
    pub queue_ahead: usize,
    /// Minutes waiting for a driver.
    pub wait_minutes: f64,
    /// Minutes on the road.
    pub travel_minutes: f64,
}

impl DeliveryBreakdown {
    /// Wait plus travel (minutes).
    pub fn total_minutes(&self) -> f64 {
        self.wait_minutes + self.travel_minutes
    }
}

/// Delivery estimate without an oven simulation.
///
/// `total = prep + wait + travel`, for callers that only know how many
/// deliveries are queued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandaloneEstimate {
    /// Whole minutes until arrival.
    pub total_minutes: i64,
    /// Prep minutes used.
    pub prep_minutes: f64,
    /// Dispatch and travel breakdown.
    pub delivery: DeliveryBreakdown,
}

/// Estimates dispatch wait and travel under one weather condition.
#[derive(Debug, Clone)]
pub struct DeliveryEstimator<'a> {
    area: &'a LocationTable,
    unknown_location: &'a UnknownLocationPolicy,
    weather: WeatherProfile,
    base_speed_kmh: f64,
    base_stack: u32,
    rounding: MinuteRounding,
    policy: Arc<dyn DispatchPolicy>,
}

impl<'a> DeliveryEstimator<'a> {
    /// Creates an estimator for the configured weather.
    ///
    /// Fails with `UnknownWeather` when the condition has no profile.
    pub fn new(config: &'a EtaConfig) -> EtaResult<Self> {
        let weather = config.weather_profiles.profile(&config.delivery.weather)?;
        Ok(Self {
            area: &config.area,
            unknown_location: &config.delivery.unknown_location,
            weather,
            base_speed_kmh: config.delivery.base_speed_kmh,
            base_stack: config.delivery.base_stack,
            rounding: config.delivery.rounding,
            policy: config.delivery.policy.build(),
        })
    }

    /// Weather in effect.
    pub fn weather(&self) -> WeatherProfile {
        self.weather
    }

    /// Dispatch policy in effect.
    pub fn policy(&self) -> &dyn DispatchPolicy {
        self.policy.as_ref()
    }

    /// Resolves a destination under the unknown-location policy.
    pub fn resolve(&self, location: &str) -> EtaResult<ResolvedLocation> {
        self.area.lookup(location, self.unknown_location)
    }

    /// One-way drive minutes to a resolved destination.
    pub fn travel_to(&self, destination: &ResolvedLocation) -> f64 {
        travel_minutes(
            destination.distance_km,
            self.base_speed_kmh,
            self.weather.speed_multiplier * destination.speed_factor,
        )
    }

    /// One-way drive minutes for every resolvable destination.
    ///
    /// Destinations that cannot be resolved are left out of the sample.
    pub fn pending_travel<'l, I>(&self, locations: I) -> Vec<f64>
    where
        I: IntoIterator<Item = &'l str>,
    {
        locations
            .into_iter()
            .filter_map(|name| match self.resolve(name) {
                Ok(dest) => Some(self.travel_to(&dest)),
                Err(err) => {
                    warn!(location = name, %err, "pending delivery left out of round-trip average");
                    None
                }
            })
            .collect()
    }

    /// Fleet capacity for a driver count under the current weather.
    pub fn fleet_capacity(&self, drivers: u32) -> u32 {
        fleet_capacity(drivers, per_driver_capacity(self.base_stack, &self.weather))
    }

    /// Estimates wait and travel for one delivery.
    ///
    /// The driver count is read from `supply` at `ready_at`, the moment the
    /// pizzas leave the oven.
    pub fn estimate(
        &self,
        location: &str,
        ready_at: NaiveDateTime,
        queue_ahead: usize,
        pending_one_way_minutes: Vec<f64>,
        supply: &dyn DriverSupply,
    ) -> EtaResult<DeliveryBreakdown> {
        let destination = self.resolve(location)?;
        let drivers = supply.drivers_at(ready_at);
        let fleet = self.fleet_capacity(drivers);

        let context = DispatchContext::new(queue_ahead, fleet, self.weather)
            .with_pending_travel(pending_one_way_minutes);
        let wait_minutes = self.policy.wait_minutes(&context).max(0.0);
        let travel_minutes = self.travel_to(&destination);

        debug!(
            location,
            drivers,
            fleet,
            queue_ahead,
            policy = self.policy.name(),
            wait_minutes,
            travel_minutes,
            "estimated delivery"
        );

        Ok(DeliveryBreakdown {
            location: destination.name,
            zone: destination.zone_label,
            distance_km: destination.distance_km,
            drivers,
            fleet_capacity: fleet,
            queue_ahead,
            wait_minutes,
            travel_minutes,
        })
    }

    /// Estimates arrival from prep time alone: `prep + wait + travel`.
    pub fn estimate_standalone(
        &self,
        location: &str,
        prep_minutes: f64,
        queue_ahead: usize,
        drivers: u32,
    ) -> EtaResult<StandaloneEstimate> {
        let fixed = move |_: NaiveDateTime| drivers;
        // Fixed supply ignores the timestamp
        let delivery =
            self.estimate(location, NaiveDateTime::MIN, queue_ahead, Vec::new(), &fixed)?;
        let total_minutes = self
            .rounding
            .round_minutes(prep_minutes + delivery.total_minutes());
        Ok(StandaloneEstimate {
            total_minutes,
            prep_minutes,
            delivery,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::DispatchPolicyConfig;
    use crate::models::DriverSource;

    fn config(weather: &str) -> EtaConfig {
        let mut cfg = EtaConfig::default().with_weather(weather);
        cfg.area = LocationTable::service_area().with_location("Depot Road", 2.0);
        cfg
    }

    #[test]
    fn test_capacity_never_zero() {
        let storm = WeatherProfile::new(0.5, 0.1);
        assert_eq!(per_driver_capacity(3, &storm), 1);
        assert_eq!(per_driver_capacity(0, &WeatherProfile::clear()), 1);
        assert_eq!(per_driver_capacity(3, &WeatherProfile::new(1.0, f64::NAN)), 1);
        assert_eq!(per_driver_capacity(3, &WeatherProfile::new(0.8, 0.8)), 2);
        assert_eq!(fleet_capacity(0, 2), 1);
        assert_eq!(fleet_capacity(3, 2), 6);
    }

    #[test]
    fn test_travel_in_rain() {
        // 2.0 km at 40 km/h * 0.8 = 32 km/h → 3.75 min
        assert!((travel_minutes(2.0, 40.0, 0.8) - 3.75).abs() < 1e-10);
        assert!(travel_minutes(2.0, 0.0, 1.0).is_finite());
    }

    #[test]
    fn test_estimate_uses_roster_at_ready_time() {
        let cfg = config("clear");
        let estimator = DeliveryEstimator::new(&cfg).unwrap();
        let rush = |t: NaiveDateTime| if t.format("%H").to_string() == "18" { 4u32 } else { 1 };
        let ready = chrono::NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();

        let b = estimator.estimate("Kashio", ready, 5, Vec::new(), &rush).unwrap();
        assert_eq!(b.drivers, 4);
        assert_eq!(b.fleet_capacity, 12);
        assert_eq!(b.wait_minutes, 0.0);
        assert!((b.travel_minutes - 1.5).abs() < 1e-10);
        assert_eq!(b.zone.as_deref(), Some("Near"));
    }

    #[test]
    fn test_round_based_wait() {
        let cfg = config("clear");
        let estimator = DeliveryEstimator::new(&cfg).unwrap();
        // 1 driver * 3 units; 4 ahead → round ceil(5/3) = 2
        let b = estimator
            .estimate(
                "Kashio",
                NaiveDateTime::MIN,
                4,
                Vec::new(),
                &DriverSource::Fixed { count: 1 },
            )
            .unwrap();
        assert!((b.wait_minutes - 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_unit_wait_uses_pending_sample() {
        let cfg = config("clear").with_policy(DispatchPolicyConfig::UnitWait {
            stay_minutes: 5.0,
            fallback_round_trip_minutes: 30.0,
            min_round_trip_minutes: 19.0,
        });
        let estimator = DeliveryEstimator::new(&cfg).unwrap();
        let sample = estimator.pending_travel(["Tsukimiyama", "Chojugaoka", "Atlantis"]);
        // 6 km at 40 km/h = 9 min each; unknown location skipped
        assert_eq!(sample.len(), 2);

        let b = estimator
            .estimate("Kashio", NaiveDateTime::MIN, 2, sample, &DriverSource::Fixed { count: 1 })
            .unwrap();
        // avg round trip 9*2+5 = 23; fleet 3; 2 ahead → 2 * 23 / 3
        assert!((b.wait_minutes - 46.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_standalone_estimate() {
        let cfg = config("rain");
        let estimator = DeliveryEstimator::new(&cfg).unwrap();
        let est = estimator
            .estimate_standalone("Depot Road", 15.0, 0, 3)
            .unwrap();
        // 15 + 0 + 3.75 → 18 (floor)
        assert_eq!(est.total_minutes, 18);
        assert!((est.delivery.travel_minutes - 3.75).abs() < 1e-10);
    }

    #[test]
    fn test_unknown_weather_rejected() {
        let cfg = config("hail");
        assert!(DeliveryEstimator::new(&cfg).is_err());
    }

    #[test]
    fn test_unknown_location_rejected() {
        let cfg = config("clear");
        let estimator = DeliveryEstimator::new(&cfg).unwrap();
        let err = estimator.estimate_standalone("Atlantis", 15.0, 0, 1).unwrap_err();
        assert!(matches!(err, crate::error::EtaError::InvalidLocation(_)));
    }
}
