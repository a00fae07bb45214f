//! Fleet state passed to dispatch policies.

use crate::models::WeatherProfile;

/// Slowest speed multiplier honored; smaller values are raised to it.
pub const MIN_SPEED_MULTIPLIER: f64 = 0.05;

/// Fleet load seen by one delivery at dispatch time.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchContext {
    /// Pending deliveries queued ahead of this one.
    pub queue_ahead: usize,
    /// Units the whole fleet carries per round trip (≥ 1).
    pub fleet_capacity: u32,
    /// Weather in effect.
    pub weather: WeatherProfile,
    /// One-way travel minutes of every pending delivery.
    pub pending_one_way_minutes: Vec<f64>,
}

impl DispatchContext {
    /// Creates a context with no pending travel data.
    ///
    /// A zero fleet capacity is raised to 1.
    pub fn new(queue_ahead: usize, fleet_capacity: u32, weather: WeatherProfile) -> Self {
        Self {
            queue_ahead,
            fleet_capacity: fleet_capacity.max(1),
            weather,
            pending_one_way_minutes: Vec::new(),
        }
    }

    /// Sets the one-way travel minutes of pending deliveries.
    pub fn with_pending_travel(mut self, one_way_minutes: Vec<f64>) -> Self {
        self.pending_one_way_minutes = one_way_minutes;
        self
    }

    /// Weather speed multiplier, floored at [`MIN_SPEED_MULTIPLIER`].
    #[inline]
    pub fn speed_multiplier(&self) -> f64 {
        self.weather.speed_multiplier.max(MIN_SPEED_MULTIPLIER)
    }
}
