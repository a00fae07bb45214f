//! Pending-order book.
//!
//! The one piece of shared mutable state. Orders are keyed by id; ids are
//! issued in increasing order, so iterating the map yields insertion order,
//! which the prioritizer relies on for tie-breaking.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EtaError, EtaResult};
use crate::models::{Order, OrderId, OrderRequest};

/// Unordered pending set with stable ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Order>", into = "Vec<Order>")]
pub struct OrderBook {
    orders: BTreeMap<OrderId, Order>,
    // `None` once `u64::MAX` has been issued.
    next_id: Option<u64>,
}

impl OrderBook {
    /// Creates an empty book. The first id issued is 1.
    pub fn new() -> Self {
        Self {
            orders: BTreeMap::new(),
            next_id: Some(1),
        }
    }

    /// Rebuilds a book from a snapshot.
    ///
    /// On duplicate ids the later entry wins. New ids continue after the
    /// largest one seen; a snapshot holding `u64::MAX` admits nothing new.
    pub fn from_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let mut book = Self::new();
        for order in orders {
            book.next_id = book
                .next_id
                .zip(order.id.0.checked_add(1))
                .map(|(next, after)| next.max(after));
            if let Some(previous) = book.orders.insert(order.id, order) {
                warn!(id = %previous.id, "duplicate order id in snapshot, keeping the later entry");
            }
        }
        book
    }

    /// Admits a new order and returns its id.
    ///
    /// Fails with `IdsExhausted` rather than reuse an id.
    pub fn add_order(&mut self, request: OrderRequest, now: NaiveDateTime) -> EtaResult<OrderId> {
        let id = OrderId(self.next_id.ok_or(EtaError::IdsExhausted)?);
        let order = request.into_order(id, now)?;
        debug!(%id, kind = ?order.kind, count = order.count, "order added");
        self.orders.insert(id, order);
        self.next_id = id.0.checked_add(1);
        Ok(id)
    }

    /// Removes a finished order.
    ///
    /// Returns `NotFound` for unknown ids; the book is left untouched.
    pub fn complete_order(&mut self, id: OrderId) -> EtaResult<Order> {
        let order = self.orders.remove(&id).ok_or(EtaError::NotFound(id))?;
        debug!(%id, "order completed");
        Ok(order)
    }

    /// Looks up a pending order.
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// Pending orders in insertion order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Pending deliveries in insertion order.
    pub fn deliveries(&self) -> impl Iterator<Item = &Order> {
        self.orders().filter(|o| o.is_delivery())
    }

    /// Total pizza units pending.
    pub fn pending_units(&self) -> u64 {
        self.orders().map(|o| u64::from(o.count)).sum()
    }

    /// Ids the next `n` admissions would receive.
    ///
    /// Fails with `IdsExhausted` when fewer than `n` ids remain.
    pub fn peek_ids(&self, n: usize) -> EtaResult<Vec<OrderId>> {
        let first = self.next_id.ok_or(EtaError::IdsExhausted)?;
        (0..n as u64)
            .map(|i| first.checked_add(i).map(OrderId).ok_or(EtaError::IdsExhausted))
            .collect()
    }

    /// Number of pending orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Order>> for OrderBook {
    fn from(orders: Vec<Order>) -> Self {
        Self::from_orders(orders)
    }
}

impl From<OrderBook> for Vec<Order> {
    fn from(book: OrderBook) -> Self {
        book.orders.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_add_and_complete() {
        let mut book = OrderBook::new();
        let a = book.add_order(OrderRequest::takeout(2), now()).unwrap();
        let b = book.add_order(OrderRequest::delivery(1, "Kashio"), now()).unwrap();

        assert_eq!(a, OrderId(1));
        assert_eq!(b, OrderId(2));
        assert_eq!(book.len(), 2);
        assert_eq!(book.pending_units(), 3);
        assert_eq!(book.deliveries().count(), 1);

        let done = book.complete_order(a).unwrap();
        assert_eq!(done.count, 2);
        assert!(book.get(a).is_none());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_complete_unknown_is_not_found() {
        let mut book = OrderBook::new();
        book.add_order(OrderRequest::takeout(1), now()).unwrap();
        let err = book.complete_order(OrderId(99)).unwrap_err();
        assert!(matches!(err, EtaError::NotFound(OrderId(99))));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut book = OrderBook::new();
        let a = book.add_order(OrderRequest::takeout(1), now()).unwrap();
        book.complete_order(a).unwrap();
        let b = book.add_order(OrderRequest::takeout(1), now()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_request_not_admitted() {
        let mut book = OrderBook::new();
        assert!(book.add_order(OrderRequest::takeout(0), now()).is_err());
        assert!(book.is_empty());
        assert_eq!(book.peek_ids(1).unwrap(), vec![OrderId(1)]);
    }

    #[test]
    fn test_peek_ids_match_admission() {
        let mut book = OrderBook::new();
        book.add_order(OrderRequest::takeout(1), now()).unwrap();
        let peeked = book.peek_ids(2).unwrap();
        let c = book.add_order(OrderRequest::takeout(1), now()).unwrap();
        let d = book.add_order(OrderRequest::takeout(1), now()).unwrap();
        assert_eq!(peeked, vec![c, d]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut book = OrderBook::new();
        book.add_order(OrderRequest::takeout(1), now()).unwrap();
        book.add_order(OrderRequest::delivery(2, "Kotoen"), now()).unwrap();

        let json = serde_json::to_string(&book).unwrap();
        let restored: OrderBook = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, book);
        assert_eq!(restored.peek_ids(1).unwrap(), vec![OrderId(3)]);
    }

    #[test]
    fn test_exhausted_ids_never_overwrite() {
        let last = OrderRequest::takeout(4)
            .into_order(OrderId(u64::MAX), now())
            .unwrap();
        let mut book = OrderBook::from_orders(vec![last]);

        let err = book.add_order(OrderRequest::takeout(1), now()).unwrap_err();
        assert!(matches!(err, EtaError::IdsExhausted));
        assert!(matches!(book.peek_ids(1), Err(EtaError::IdsExhausted)));
        assert_eq!(book.len(), 1);
        assert_eq!(book.pending_units(), 4);
    }

    #[test]
    fn test_last_id_issued_once() {
        let near = OrderRequest::takeout(1)
            .into_order(OrderId(u64::MAX - 1), now())
            .unwrap();
        let mut book = OrderBook::from_orders(vec![near]);

        assert_eq!(book.peek_ids(1).unwrap(), vec![OrderId(u64::MAX)]);
        assert!(book.peek_ids(2).is_err());

        let id = book.add_order(OrderRequest::takeout(2), now()).unwrap();
        assert_eq!(id, OrderId(u64::MAX));
        assert!(book.add_order(OrderRequest::takeout(1), now()).is_err());
        assert_eq!(book.pending_units(), 3);
    }
}
