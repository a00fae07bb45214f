//! Driver roster models.
//!
//! Maps a wall-clock time to the number of drivers on the road.
//!
//! # Precedence
//! Shifts stack: the driver count at a time of day is the sum over every
//! shift covering it. A time covered by no shift gets `off_hours_drivers`.
//! Shifts are half-open `[start, end)`; a shift whose end is not after its
//! start wraps past midnight.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Anything that can answer "how many drivers are out at this time?".
pub trait DriverSupply {
    /// Driver count at `at`.
    fn drivers_at(&self, at: NaiveDateTime) -> u32;
}

impl<F> DriverSupply for F
where
    F: Fn(NaiveDateTime) -> u32,
{
    fn drivers_at(&self, at: NaiveDateTime) -> u32 {
        self(at)
    }
}

/// A block of drivers working between two times of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Shift start (inclusive).
    #[serde(with = "hh_mm")]
    pub start: NaiveTime,
    /// Shift end (exclusive).
    #[serde(with = "hh_mm")]
    pub end: NaiveTime,
    /// Drivers working this shift.
    pub drivers: u32,
}

impl Shift {
    /// Creates a new shift.
    pub fn new(start: NaiveTime, end: NaiveTime, drivers: u32) -> Self {
        Self {
            start,
            end,
            drivers,
        }
    }

    /// Creates a shift on whole hours.
    ///
    /// Hours outside 0..24 fall back to midnight.
    pub fn hours(start_hour: u32, end_hour: u32, drivers: u32) -> Self {
        let hour = |h: u32| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
        Self::new(hour(start_hour), hour(end_hour), drivers)
    }

    /// Whether a time of day falls within this shift.
    #[inline]
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start < self.end {
            t >= self.start && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }
}

/// Time-varying driver availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRoster {
    /// Working shifts.
    #[serde(default)]
    pub shifts: Vec<Shift>,
    /// Drivers outside every shift.
    #[serde(default = "default_off_hours_drivers")]
    pub off_hours_drivers: u32,
}

fn default_off_hours_drivers() -> u32 {
    1
}

impl DriverRoster {
    /// Creates an empty roster (off-hours count everywhere).
    pub fn new(off_hours_drivers: u32) -> Self {
        Self {
            shifts: Vec::new(),
            off_hours_drivers,
        }
    }

    /// Adds a shift.
    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.shifts.push(shift);
        self
    }
}

impl Default for DriverRoster {
    fn default() -> Self {
        Self::new(default_off_hours_drivers())
    }
}

impl DriverSupply for DriverRoster {
    fn drivers_at(&self, at: NaiveDateTime) -> u32 {
        let t = at.time();
        let mut covered = false;
        let mut total = 0u32;
        for shift in self.shifts.iter().filter(|s| s.contains(t)) {
            covered = true;
            total = total.saturating_add(shift.drivers);
        }
        if covered {
            total
        } else {
            self.off_hours_drivers
        }
    }
}

/// Where the driver count comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DriverSource {
    /// A constant count regardless of time.
    Fixed {
        /// Drivers on the road.
        count: u32,
    },
    /// Evaluated against a roster at bake completion.
    Roster(DriverRoster),
}

impl Default for DriverSource {
    fn default() -> Self {
        DriverSource::Fixed { count: 3 }
    }
}

impl DriverSupply for DriverSource {
    fn drivers_at(&self, at: NaiveDateTime) -> u32 {
        match self {
            DriverSource::Fixed { count } => *count,
            DriverSource::Roster(roster) => roster.drivers_at(at),
        }
    }
}

/// Serde adapter for `HH:MM` times of day.
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_shift_contains() {
        let s = Shift::hours(11, 14, 2);
        assert!(s.contains(at(11, 0).time()));
        assert!(s.contains(at(13, 59).time()));
        assert!(!s.contains(at(14, 0).time())); // exclusive end
        assert!(!s.contains(at(10, 59).time()));
    }

    #[test]
    fn test_shift_wraps_midnight() {
        let s = Shift::hours(22, 2, 1);
        assert!(s.contains(at(23, 30).time()));
        assert!(s.contains(at(1, 0).time()));
        assert!(!s.contains(at(12, 0).time()));
    }

    #[test]
    fn test_roster_off_hours() {
        let roster = DriverRoster::new(1).with_shift(Shift::hours(17, 21, 4));
        assert_eq!(roster.drivers_at(at(9, 0)), 1);
        assert_eq!(roster.drivers_at(at(18, 0)), 4);
    }

    #[test]
    fn test_roster_shifts_stack() {
        let roster = DriverRoster::new(1)
            .with_shift(Shift::hours(11, 21, 2))
            .with_shift(Shift::hours(17, 20, 3));
        assert_eq!(roster.drivers_at(at(12, 0)), 2);
        assert_eq!(roster.drivers_at(at(18, 0)), 5);
        assert_eq!(roster.drivers_at(at(20, 30)), 2);
    }

    #[test]
    fn test_closure_supply() {
        let lunch_rush = |t: NaiveDateTime| if t.time() < at(14, 0).time() { 5u32 } else { 2 };
        assert_eq!(lunch_rush.drivers_at(at(12, 0)), 5);
        assert_eq!(lunch_rush.drivers_at(at(15, 0)), 2);
    }

    #[test]
    fn test_driver_source_from_toml() {
        let src: DriverSource = toml::from_str(
            r#"
            mode = "roster"
            off_hours_drivers = 1
            [[shifts]]
            start = "17:00"
            end = "21:30"
            drivers = 3
            "#,
        )
        .unwrap();
        assert_eq!(src.drivers_at(at(21, 15)), 3);
        assert_eq!(src.drivers_at(at(21, 30)), 1);

        let fixed = DriverSource::Fixed { count: 2 };
        assert_eq!(fixed.drivers_at(at(3, 0)), 2);
    }
}
