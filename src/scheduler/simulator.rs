//! Schedule simulator.
//!
//! The single query external callers use. A simulation is a pure function
//! of (pending snapshot, hypothetical orders, configuration, now):
//!
//! 1. Give hypothetical orders the ids they would get if committed.
//! 2. Prioritize pending + hypothetical orders into one oven queue.
//! 3. Pack the queue onto the ovens; each unit may enter no earlier than
//!    `priority_time + prep`.
//! 4. For each hypothetical delivery, estimate dispatch wait and travel
//!    from its bake completion.
//!
//! Nothing in the order book is touched; [`Simulator::commit`] is the only
//! path from a what-if order to a pending one.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::{info, instrument};

use super::delivery::{DeliveryBreakdown, DeliveryEstimator};
use super::oven::{BakeTask, OvenAllocator};
use super::prioritizer::Prioritizer;
use crate::config::EtaConfig;
use crate::error::{EtaError, EtaResult};
use crate::models::{DriverSupply, Order, OrderId, OrderKind, OrderRequest};
use crate::store::OrderBook;
use crate::time::{iso_minute, minute_now, minutes_to_ms, offset_ms, truncate_to_minute};

/// Minutes over the unloaded baseline before an estimate counts as congested.
pub const CONGESTION_GRACE_MINUTES: i64 = 2;

/// Estimated timeline of one hypothetical order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    /// Id the order gets if committed now.
    pub order_id: OrderId,
    /// Takeout or delivery.
    pub kind: OrderKind,
    /// Units ordered.
    pub count: u32,
    /// The sampled "now" of this simulation.
    #[serde(with = "iso_minute")]
    pub evaluated_at: NaiveDateTime,
    /// When the last unit leaves the oven.
    #[serde(with = "iso_minute")]
    pub ready_at: NaiveDateTime,
    /// Pickup-ready time for takeout, arrival time for delivery.
    #[serde(with = "iso_minute")]
    pub completed_at: NaiveDateTime,
    /// Whole minutes from `evaluated_at` to `completed_at`.
    pub minutes_until_complete: i64,
    /// Whole minutes beyond what an idle kitchen (or the reservation target) would need.
    pub extra_wait_minutes: i64,
    /// More than [`CONGESTION_GRACE_MINUTES`] of extra wait.
    pub congested: bool,
    /// Dispatch and travel breakdown for deliveries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryBreakdown>,
}

/// Runs what-if queries against a pending snapshot.
///
/// # Example
///
/// ```
/// use pizza_eta::{EtaConfig, OrderBook, OrderRequest, Simulator};
/// use chrono::{Duration, NaiveDate};
///
/// let config = EtaConfig::default();
/// let book = OrderBook::new();
/// let now = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap().and_hms_opt(18, 0, 0).unwrap();
///
/// let estimate = Simulator::new(&config)
///     .simulate(&book, &OrderRequest::takeout(1), now)
///     .unwrap();
/// // 15 min prep + 6.5 min bake, floored
/// assert_eq!(estimate.completed_at, now + Duration::minutes(21));
/// ```
#[derive(Clone, Copy)]
pub struct Simulator<'a> {
    config: &'a EtaConfig,
    supply: &'a dyn DriverSupply,
}

impl<'a> Simulator<'a> {
    /// Creates a simulator using the configured driver source.
    pub fn new(config: &'a EtaConfig) -> Self {
        Self {
            config,
            supply: &config.delivery.drivers,
        }
    }

    /// Overrides the driver source (e.g., a live roster lookup).
    pub fn with_driver_supply(mut self, supply: &'a dyn DriverSupply) -> Self {
        self.supply = supply;
        self
    }

    /// Estimates one hypothetical order.
    pub fn simulate(
        &self,
        book: &OrderBook,
        request: &OrderRequest,
        now: NaiveDateTime,
    ) -> EtaResult<Estimate> {
        self.simulate_batch(book, std::slice::from_ref(request), now)?
            .into_values()
            .next()
            .ok_or(EtaError::EmptyResult)
    }

    /// Estimates one hypothetical order against the current wall clock.
    pub fn simulate_now(&self, book: &OrderBook, request: &OrderRequest) -> EtaResult<Estimate> {
        self.simulate(book, request, minute_now())
    }

    /// Estimates several hypothetical orders placed together.
    ///
    /// Each one sees the others as if they had been committed in the
    /// given order. Fails with `EmptyResult` when `requests` is empty.
    #[instrument(
        level = "debug",
        skip_all,
        fields(pending = book.len(), hypothetical = requests.len())
    )]
    pub fn simulate_batch(
        &self,
        book: &OrderBook,
        requests: &[OrderRequest],
        now: NaiveDateTime,
    ) -> EtaResult<BTreeMap<OrderId, Estimate>> {
        if requests.is_empty() {
            return Err(EtaError::EmptyResult);
        }
        let now = truncate_to_minute(now);
        let kitchen = &self.config.kitchen;

        let hypothetical: Vec<Order> = book
            .peek_ids(requests.len())?
            .into_iter()
            .zip(requests)
            .map(|(id, request)| request.clone().into_order(id, now))
            .collect::<EtaResult<_>>()?;

        let estimator = DeliveryEstimator::new(self.config)?;
        for order in hypothetical.iter().filter(|o| o.is_delivery()) {
            estimator.resolve(destination(order)?)?;
        }

        let queue = Prioritizer::from_config(kitchen).prioritize(book.orders(), &hypothetical, now);

        let prep_ms = minutes_to_ms(kitchen.prep_minutes);
        let tasks: Vec<BakeTask> = queue
            .iter()
            .map(|task| BakeTask::new(task.order.count, task.priority_ms.saturating_add(prep_ms)))
            .collect();
        let plan = OvenAllocator::from_config(kitchen).allocate(&tasks, 0);

        let pending_travel = if hypothetical.iter().any(Order::is_delivery) {
            estimator.pending_travel(book.deliveries().filter_map(|o| o.location.as_deref()))
        } else {
            Vec::new()
        };

        let mut results = BTreeMap::new();
        let mut deliveries_ahead = 0usize;

        for (index, task) in queue.iter().enumerate() {
            let order = task.order;
            if task.transient {
                let ready_ms = plan.finish_ms[index];
                let delivery = if order.is_delivery() {
                    let ready_at = now
                        .checked_add_signed(Duration::milliseconds(ready_ms))
                        .unwrap_or(NaiveDateTime::MAX);
                    Some(estimator.estimate(
                        destination(order)?,
                        ready_at,
                        deliveries_ahead,
                        pending_travel.clone(),
                        self.supply,
                    )?)
                } else {
                    None
                };
                results.insert(order.id, self.summarize(order, now, ready_ms, delivery));
            }
            if order.is_delivery() {
                deliveries_ahead += 1;
            }
        }

        for estimate in results.values() {
            info!(
                id = %estimate.order_id,
                kind = ?estimate.kind,
                minutes = estimate.minutes_until_complete,
                extra = estimate.extra_wait_minutes,
                "simulated order"
            );
        }

        Ok(results)
    }

    /// Admits a request into the book after checking its destination.
    ///
    /// The only operation that turns a what-if order into a pending one.
    pub fn commit(
        &self,
        book: &mut OrderBook,
        request: OrderRequest,
        now: NaiveDateTime,
    ) -> EtaResult<OrderId> {
        request.validate()?;
        if let (OrderKind::Delivery, Some(location)) = (request.kind, request.location.as_deref()) {
            self.config
                .area
                .lookup(location, &self.config.delivery.unknown_location)?;
        }
        book.add_order(request, truncate_to_minute(now))
    }

    fn summarize(
        &self,
        order: &Order,
        now: NaiveDateTime,
        ready_ms: i64,
        delivery: Option<DeliveryBreakdown>,
    ) -> Estimate {
        let rounding = self.config.delivery.rounding;
        let kitchen = &self.config.kitchen;

        let (wait_ms, travel_ms) = delivery.as_ref().map_or((0, 0), |d| {
            (minutes_to_ms(d.wait_minutes), minutes_to_ms(d.travel_minutes))
        });
        let total_ms = ready_ms.saturating_add(wait_ms).saturating_add(travel_ms);

        let mut expected_ms = minutes_to_ms(kitchen.prep_minutes)
            .saturating_add(minutes_to_ms(kitchen.bake_minutes))
            .saturating_add(travel_ms);
        if order.is_reservation {
            expected_ms = expected_ms.max(offset_ms(now, order.target_time));
        }
        let extra_wait_minutes =
            rounding.whole_minutes(total_ms.saturating_sub(expected_ms).max(0));

        Estimate {
            order_id: order.id,
            kind: order.kind,
            count: order.count,
            evaluated_at: now,
            ready_at: rounding.timestamp(now, ready_ms),
            completed_at: rounding.timestamp(now, total_ms),
            minutes_until_complete: rounding.whole_minutes(total_ms),
            extra_wait_minutes,
            congested: extra_wait_minutes > CONGESTION_GRACE_MINUTES,
            delivery,
        }
    }
}

fn destination(order: &Order) -> EtaResult<&str> {
    order.location.as_deref().ok_or(EtaError::MissingLocation)
}
