//! Order prioritizer.
//!
//! Turns pending and hypothetical orders into a single oven queue.
//!
//! # Priority Time
//! - ASAP order: its creation time.
//! - Reservation: `target - look_ahead`, clamped to "now" so a reservation
//!   whose window has already opened (or whose target has passed) queues
//!   immediately rather than in the past.
//!
//! Sorting is stable: equal priority times keep insertion order, pending
//! orders first, then hypothetical ones in the order given. Because a
//! reservation's priority time may precede an earlier-placed ASAP order's
//! creation time, reservations can cut in line.

use chrono::NaiveDateTime;

use crate::config::KitchenConfig;
use crate::models::Order;
use crate::time::{minutes_to_ms, offset_ms};

/// An order positioned in the oven queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedTask<'a> {
    /// The order being baked.
    pub order: &'a Order,
    /// Queue ordering key (ms offset from now).
    pub priority_ms: i64,
    /// `true` for hypothetical orders that are not in the order book.
    pub transient: bool,
}

/// Computes priority times and sorts the oven queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prioritizer {
    look_ahead_ms: i64,
}

impl Prioritizer {
    /// Creates a prioritizer with the given look-ahead window.
    pub fn new(look_ahead_ms: i64) -> Self {
        Self {
            look_ahead_ms: look_ahead_ms.max(0),
        }
    }

    /// Creates a prioritizer from kitchen settings.
    pub fn from_config(kitchen: &KitchenConfig) -> Self {
        Self::new(minutes_to_ms(kitchen.look_ahead_minutes))
    }

    /// Priority time of one order (ms offset from `now`).
    pub fn priority_ms(&self, order: &Order, now: NaiveDateTime) -> i64 {
        if order.is_reservation {
            offset_ms(now, order.target_time)
                .saturating_sub(self.look_ahead_ms)
                .max(0)
        } else {
            offset_ms(now, order.created_at)
        }
    }

    /// Builds the time-ordered queue.
    pub fn prioritize<'a, I>(
        &self,
        pending: I,
        hypothetical: &'a [Order],
        now: NaiveDateTime,
    ) -> Vec<QueuedTask<'a>>
    where
        I: IntoIterator<Item = &'a Order>,
    {
        let mut queue: Vec<QueuedTask<'a>> = pending
            .into_iter()
            .map(|order| (order, false))
            .chain(hypothetical.iter().map(|order| (order, true)))
            .map(|(order, transient)| QueuedTask {
                order,
                priority_ms: self.priority_ms(order, now),
                transient,
            })
            .collect();

        // Vec::sort_by_key is stable
        queue.sort_by_key(|task| task.priority_ms);
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderId, OrderRequest};
    use chrono::NaiveDate;

    const MIN: i64 = 60_000;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn asap(id: u64, placed: NaiveDateTime) -> Order {
        OrderRequest::takeout(1)
            .placed_at(placed)
            .into_order(OrderId(id), placed)
            .unwrap()
    }

    fn reservation(id: u64, placed: NaiveDateTime, target: NaiveDateTime) -> Order {
        OrderRequest::takeout(1)
            .placed_at(placed)
            .reserved_for(target)
            .into_order(OrderId(id), placed)
            .unwrap()
    }

    fn ids(queue: &[QueuedTask<'_>]) -> Vec<u64> {
        queue.iter().map(|t| t.order.id.0).collect()
    }

    #[test]
    fn test_asap_priority_is_creation_time() {
        let p = Prioritizer::new(30 * MIN);
        let order = asap(1, at(17, 50));
        assert_eq!(p.priority_ms(&order, at(18, 0)), -10 * MIN);
    }

    #[test]
    fn test_reservation_look_ahead() {
        let p = Prioritizer::new(30 * MIN);
        let order = reservation(1, at(12, 0), at(19, 0));
        assert_eq!(p.priority_ms(&order, at(18, 0)), 30 * MIN);
    }

    #[test]
    fn test_past_reservation_clamped_to_now() {
        let p = Prioritizer::new(30 * MIN);
        let late = reservation(1, at(12, 0), at(17, 45));
        assert_eq!(p.priority_ms(&late, at(18, 0)), 0);
        let window_open = reservation(2, at(12, 0), at(18, 10));
        assert_eq!(p.priority_ms(&window_open, at(18, 0)), 0);
    }

    #[test]
    fn test_reservation_cuts_in_line() {
        let p = Prioritizer::new(30 * MIN);
        let now = at(18, 0);
        // ASAP placed at 18:05 (clock skew / future entry) vs reservation for 18:20
        let pending = vec![asap(1, at(18, 5)), reservation(2, at(11, 0), at(18, 20))];
        let queue = p.prioritize(&pending, &[], now);
        assert_eq!(ids(&queue), vec![2, 1]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let p = Prioritizer::new(30 * MIN);
        let now = at(18, 0);
        let pending = vec![asap(3, now), asap(1, now)];
        let hypothetical = vec![asap(9, now)];
        let queue = p.prioritize(&pending, &hypothetical, now);
        assert_eq!(ids(&queue), vec![3, 1, 9]);
        assert!(!queue[0].transient);
        assert!(queue[2].transient);
    }

    #[test]
    fn test_distinct_asap_order_independent_of_input_order() {
        let p = Prioritizer::new(30 * MIN);
        let now = at(18, 0);
        let a = asap(1, at(17, 40));
        let b = asap(2, at(17, 50));

        let forward = vec![a.clone(), b.clone()];
        let reversed = vec![b, a];
        assert_eq!(ids(&p.prioritize(&forward, &[], now)), vec![1, 2]);
        assert_eq!(ids(&p.prioritize(&reversed, &[], now)), vec![1, 2]);
    }
}
