//! Delivery location and zone tables.
//!
//! A location is a named destination. It either states its distance
//! directly or points at a zone that supplies a distance, a human label
//! and a speed factor (for hilly or congested areas). A direct distance
//! wins over the zone's.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EtaError, EtaResult};

/// A distance band of the service area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
    /// Typical one-way distance to the zone (km).
    pub distance_km: f64,
    /// Extra speed multiplier on top of the weather profile (1.0 = none).
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f64,
}

fn default_speed_factor() -> f64 {
    1.0
}

impl Zone {
    /// Creates a zone with a neutral speed factor.
    pub fn new(label: impl Into<String>, distance_km: f64) -> Self {
        Self {
            label: label.into(),
            distance_km,
            speed_factor: 1.0,
        }
    }

    /// Sets the speed factor.
    pub fn with_speed_factor(mut self, factor: f64) -> Self {
        self.speed_factor = factor;
        self
    }
}

/// A location entry: a bare zone id or an explicit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationEntry {
    /// Inherit everything from a zone.
    Zone(String),
    /// Explicit distance and/or zone tag.
    Detailed {
        /// Zone tag.
        #[serde(default)]
        zone: Option<String>,
        /// Direct distance (km), overriding the zone's.
        #[serde(default)]
        distance_km: Option<f64>,
    },
}

impl LocationEntry {
    fn zone_id(&self) -> Option<&str> {
        match self {
            LocationEntry::Zone(z) => Some(z),
            LocationEntry::Detailed { zone, .. } => zone.as_deref(),
        }
    }

    fn distance_km(&self) -> Option<f64> {
        match self {
            LocationEntry::Zone(_) => None,
            LocationEntry::Detailed { distance_km, .. } => *distance_km,
        }
    }
}

/// What to do with a destination missing from the table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum UnknownLocationPolicy {
    /// Fail with `InvalidLocation`.
    #[default]
    Reject,
    /// Estimate with a placeholder distance.
    DefaultDistance {
        /// Placeholder one-way distance (km).
        km: f64,
    },
}

/// A destination resolved against the tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    /// Destination name as requested.
    pub name: String,
    /// One-way distance (km).
    pub distance_km: f64,
    /// Zone label, if the location belongs to one.
    pub zone_label: Option<String>,
    /// Zone speed factor (1.0 when no zone).
    pub speed_factor: f64,
}

/// Static zone and location reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationTable {
    /// Zones by id.
    #[serde(default)]
    pub zones: BTreeMap<String, Zone>,
    /// Locations by name.
    #[serde(default)]
    pub locations: BTreeMap<String, LocationEntry>,
}

impl LocationTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            zones: BTreeMap::new(),
            locations: BTreeMap::new(),
        }
    }

    /// Adds a zone.
    pub fn with_zone(mut self, id: impl Into<String>, zone: Zone) -> Self {
        self.zones.insert(id.into(), zone);
        self
    }

    /// Adds a location inheriting from a zone.
    pub fn with_zoned_location(mut self, name: impl Into<String>, zone: impl Into<String>) -> Self {
        self.locations
            .insert(name.into(), LocationEntry::Zone(zone.into()));
        self
    }

    /// Adds a location with a direct distance.
    pub fn with_location(mut self, name: impl Into<String>, distance_km: f64) -> Self {
        self.locations.insert(
            name.into(),
            LocationEntry::Detailed {
                zone: None,
                distance_km: Some(distance_km),
            },
        );
        self
    }

    /// Resolves a known location.
    ///
    /// Returns `None` when the name is absent or its record yields no
    /// distance (dangling zone tag and no direct distance).
    pub fn resolve(&self, name: &str) -> Option<ResolvedLocation> {
        let entry = self.locations.get(name)?;
        let zone = entry.zone_id().and_then(|id| self.zones.get(id));
        let distance_km = entry.distance_km().or(zone.map(|z| z.distance_km))?;
        Some(ResolvedLocation {
            name: name.to_string(),
            distance_km,
            zone_label: zone.map(|z| z.label.clone()),
            speed_factor: zone.map_or(1.0, |z| z.speed_factor),
        })
    }

    /// Resolves a location, applying the unknown-location policy.
    pub fn lookup(
        &self,
        name: &str,
        policy: &UnknownLocationPolicy,
    ) -> EtaResult<ResolvedLocation> {
        if let Some(resolved) = self.resolve(name) {
            return Ok(resolved);
        }
        match policy {
            UnknownLocationPolicy::Reject => Err(EtaError::InvalidLocation(name.to_string())),
            UnknownLocationPolicy::DefaultDistance { km } => {
                warn!(location = name, km, "unknown location, using placeholder distance");
                Ok(ResolvedLocation {
                    name: name.to_string(),
                    distance_km: *km,
                    zone_label: None,
                    speed_factor: 1.0,
                })
            }
        }
    }

    /// One-way distance for a location (km).
    pub fn distance_km(&self, name: &str) -> Option<f64> {
        self.resolve(name).map(|r| r.distance_km)
    }

    /// The store's service area: four distance bands around the shop.
    pub fn service_area() -> Self {
        const AREA: &[(&str, &str)] = &[
            ("Kashio", "zone_a"),
            ("Obuki", "zone_a"),
            ("Kamei", "zone_a"),
            ("Suenari", "zone_a"),
            ("Onari", "zone_a"),
            ("Obayashi", "zone_a"),
            ("Komyo", "zone_a"),
            ("Takatsukasa", "zone_a"),
            ("Danjo 1-4", "zone_b"),
            ("Chigusa", "zone_b"),
            ("Nigawa", "zone_b"),
            ("Nigawa Takadai", "zone_b"),
            ("Nigawa Takamaru", "zone_b"),
            ("Nigawa 5-6", "zone_c"),
            ("Uegahara", "zone_c"),
            ("Kami-Kotoen", "zone_b"),
            ("Kotoen", "zone_b"),
            ("Kami-Oichi", "zone_c"),
            ("Shimo-Oichi", "zone_c"),
            ("Danjo 5-8", "zone_c"),
            ("Akura-Nishi", "zone_b"),
            ("Akura-Naka", "zone_b"),
            ("Nishino", "zone_b"),
            ("Nakano-Nishi", "zone_b"),
            ("Nakano-Kita", "zone_b"),
            ("Miza", "zone_c"),
            ("Kohama", "zone_c"),
            ("Yayoi", "zone_c"),
            ("Fukui", "zone_a"),
            ("Suehiro", "zone_b"),
            ("Nakasu", "zone_b"),
            ("Sakasegawa", "zone_a"),
            ("Minamiguchi", "zone_c"),
            ("Hikarigaoka", "zone_c"),
            ("Aobadai", "zone_c"),
            ("Jurakuso", "zone_c"),
            ("Chojugaoka", "zone_d"),
            ("Tsukimiyama", "zone_d"),
            ("Hoshoen", "zone_c"),
            ("Sakasedai", "zone_c"),
            ("Nogami 1-3", "zone_b"),
            ("Nogami 4-6", "zone_c"),
        ];

        let table = Self::new()
            .with_zone("zone_a", Zone::new("Near", 1.0))
            .with_zone("zone_b", Zone::new("Mid-range", 2.0))
            .with_zone("zone_c", Zone::new("Far", 4.0))
            .with_zone("zone_d", Zone::new("Outer", 6.0));

        AREA.iter()
            .fold(table, |t, (name, zone)| t.with_zoned_location(*name, *zone))
    }
}

impl Default for LocationTable {
    fn default() -> Self {
        Self::service_area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoned_location() {
        let table = LocationTable::service_area();
        let r = table.resolve("Kashio").unwrap();
        assert!((r.distance_km - 1.0).abs() < 1e-10);
        assert_eq!(r.zone_label.as_deref(), Some("Near"));
        assert!((r.speed_factor - 1.0).abs() < 1e-10);

        assert_eq!(table.distance_km("Tsukimiyama"), Some(6.0));
        assert_eq!(table.locations.len(), 42);
    }

    #[test]
    fn test_direct_distance_overrides_zone() {
        let mut table = LocationTable::new()
            .with_zone("hill", Zone::new("Hillside", 3.0).with_speed_factor(0.7))
            .with_location("Plain", 2.5);
        table.locations.insert(
            "Summit".into(),
            LocationEntry::Detailed {
                zone: Some("hill".into()),
                distance_km: Some(3.4),
            },
        );

        let summit = table.resolve("Summit").unwrap();
        assert!((summit.distance_km - 3.4).abs() < 1e-10);
        assert!((summit.speed_factor - 0.7).abs() < 1e-10);
        assert_eq!(summit.zone_label.as_deref(), Some("Hillside"));

        let plain = table.resolve("Plain").unwrap();
        assert!(plain.zone_label.is_none());
    }

    #[test]
    fn test_unknown_location_policies() {
        let table = LocationTable::service_area();

        let err = table
            .lookup("Atlantis", &UnknownLocationPolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, EtaError::InvalidLocation(ref n) if n == "Atlantis"));

        let placeholder = table
            .lookup("Atlantis", &UnknownLocationPolicy::DefaultDistance { km: 3.0 })
            .unwrap();
        assert!((placeholder.distance_km - 3.0).abs() < 1e-10);

        assert_eq!(UnknownLocationPolicy::default(), UnknownLocationPolicy::Reject);
    }

    #[test]
    fn test_dangling_zone_unresolved() {
        let table = LocationTable::new().with_zoned_location("Nowhere", "zone_x");
        assert!(table.resolve("Nowhere").is_none());
    }

    #[test]
    fn test_table_from_toml() {
        let table: LocationTable = toml::from_str(
            r#"
            [zones.near]
            label = "Near"
            distance_km = 1.5

            [locations]
            "Station" = "near"
            "Harbor" = { distance_km = 5.0 }
            "#,
        )
        .unwrap();

        assert_eq!(table.distance_km("Station"), Some(1.5));
        assert_eq!(table.distance_km("Harbor"), Some(5.0));
    }
}
