//! Minute-resolution clock helpers.
//!
//! # Time Model
//! Public timestamps are local wall-clock `NaiveDateTime`s truncated to the
//! minute. Inside one simulation every instant is an `i64` millisecond offset
//! from the sampled "now", so fractional durations such as a 6.5 minute bake
//! stay exact.

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Milliseconds per minute.
pub const MS_PER_MINUTE: i64 = 60_000;

/// Drops seconds and sub-second precision.
pub fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t - Duration::seconds(i64::from(t.second()))
        - Duration::nanoseconds(i64::from(t.nanosecond()))
}

/// Samples the local wall clock once, truncated to the minute.
pub fn minute_now() -> NaiveDateTime {
    truncate_to_minute(Local::now().naive_local())
}

/// Converts configured minutes to milliseconds.
#[inline]
pub fn minutes_to_ms(minutes: f64) -> i64 {
    (minutes * MS_PER_MINUTE as f64).round() as i64
}

/// Converts milliseconds back to fractional minutes.
#[inline]
pub fn ms_to_minutes(ms: i64) -> f64 {
    ms as f64 / MS_PER_MINUTE as f64
}

/// Signed offset of `t` from `origin` in milliseconds.
#[inline]
pub fn offset_ms(origin: NaiveDateTime, t: NaiveDateTime) -> i64 {
    (t - origin).num_milliseconds()
}

/// How a millisecond offset is turned into a customer-facing minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinuteRounding {
    /// Truncate toward the earlier minute.
    #[default]
    Floor,
    /// Round half up.
    Nearest,
    /// Round up to the next whole minute.
    Ceil,
}

impl MinuteRounding {
    /// Whole minutes for an offset.
    pub fn whole_minutes(self, ms: i64) -> i64 {
        match self {
            MinuteRounding::Floor => ms.div_euclid(MS_PER_MINUTE),
            MinuteRounding::Nearest => {
                ms.saturating_add(MS_PER_MINUTE / 2).div_euclid(MS_PER_MINUTE)
            }
            MinuteRounding::Ceil => {
                let floor = ms.div_euclid(MS_PER_MINUTE);
                if ms.rem_euclid(MS_PER_MINUTE) == 0 {
                    floor
                } else {
                    floor + 1
                }
            }
        }
    }

    /// Whole minutes for a fractional minute value.
    pub fn round_minutes(self, minutes: f64) -> i64 {
        self.whole_minutes(minutes_to_ms(minutes))
    }

    /// Resolves an offset from `origin` to a minute timestamp.
    ///
    /// Offsets past the calendar range clamp to its ends.
    pub fn timestamp(self, origin: NaiveDateTime, ms: i64) -> NaiveDateTime {
        let minutes = self.whole_minutes(ms);
        Duration::try_minutes(minutes)
            .and_then(|d| origin.checked_add_signed(d))
            .unwrap_or(if minutes < 0 {
                NaiveDateTime::MIN
            } else {
                NaiveDateTime::MAX
            })
    }
}

/// Serde adapter writing `YYYY-MM-DDTHH:MM`.
///
/// Reading also accepts a seconds component, which is truncated.
pub mod iso_minute {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M";
    const FORMAT_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Parses an ISO-8601 local timestamp, truncated to the minute.
    pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, FORMAT_SECONDS))
            .map(super::truncate_to_minute)
    }

    /// The same format for optional fields; `None` is written as `null`.
    ///
    /// Pair with `#[serde(default)]` so a missing field reads as `None`.
    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            t: &Option<NaiveDateTime>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match t {
                Some(t) => super::serialize(t, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
