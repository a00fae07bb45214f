//! Order model.
//!
//! An order asks the kitchen for N pizza units, either picked up at the
//! counter (takeout) or driven to a named location (delivery). ASAP orders
//! want their pizzas as soon as possible; reservations name a target time.
//!
//! # Time Representation
//! `created_at` and `target_time` are local wall-clock timestamps at minute
//! resolution. For an ASAP order `target_time == created_at`.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{EtaError, EtaResult};
use crate::time::{iso_minute, truncate_to_minute};

/// Stable order identifier.
///
/// Issued in increasing order by the order book, so id order is also
/// insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How the order leaves the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// Picked up at the counter.
    Takeout,
    /// Driven to the customer.
    Delivery,
}

/// A submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Takeout or delivery.
    pub kind: OrderKind,
    /// Number of pizza units (always > 0).
    pub count: u32,
    /// Destination name. Always present for deliveries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Free-form note for the kitchen.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
    /// When the order was placed.
    #[serde(with = "iso_minute")]
    pub created_at: NaiveDateTime,
    /// When the customer wants it.
    #[serde(with = "iso_minute")]
    pub target_time: NaiveDateTime,
    /// Scheduled order (true) or ASAP (false).
    pub is_reservation: bool,
}

impl Order {
    /// Whether this order needs a driver.
    #[inline]
    pub fn is_delivery(&self) -> bool {
        self.kind == OrderKind::Delivery
    }
}

/// An order that has not been given an id yet.
///
/// Used both for submissions to the order book and for what-if queries
/// against the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Takeout or delivery.
    pub kind: OrderKind,
    /// Number of pizza units.
    pub count: u32,
    /// Destination name (required for deliveries).
    #[serde(default)]
    pub location: Option<String>,
    /// Free-form note.
    #[serde(default)]
    pub note: String,
    /// Reservation target. `None` = ASAP.
    #[serde(default, with = "iso_minute::option", skip_serializing_if = "Option::is_none")]
    pub target_time: Option<NaiveDateTime>,
    /// Placement time. `None` = the moment it is admitted.
    #[serde(default, with = "iso_minute::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl OrderRequest {
    /// Creates a request of the given kind.
    pub fn new(kind: OrderKind, count: u32) -> Self {
        Self {
            kind,
            count,
            location: None,
            note: String::new(),
            target_time: None,
            created_at: None,
        }
    }

    /// Creates an ASAP takeout request.
    pub fn takeout(count: u32) -> Self {
        Self::new(OrderKind::Takeout, count)
    }

    /// Creates an ASAP delivery request.
    pub fn delivery(count: u32, location: impl Into<String>) -> Self {
        Self::new(OrderKind::Delivery, count).with_location(location)
    }

    /// Sets the destination.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the kitchen note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Turns the request into a reservation for `target`.
    pub fn reserved_for(mut self, target: NaiveDateTime) -> Self {
        self.target_time = Some(target);
        self
    }

    /// Sets the placement time explicitly.
    pub fn placed_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Checks the required fields.
    pub fn validate(&self) -> EtaResult<()> {
        if self.count == 0 {
            return Err(EtaError::ZeroCount);
        }
        if self.kind == OrderKind::Delivery
            && self.location.as_deref().is_none_or(|l| l.trim().is_empty())
        {
            return Err(EtaError::MissingLocation);
        }
        Ok(())
    }

    /// Assigns an id and resolves times, validating required fields.
    pub fn into_order(self, id: OrderId, now: NaiveDateTime) -> EtaResult<Order> {
        self.validate()?;
        let created_at = truncate_to_minute(self.created_at.unwrap_or(now));
        let (target_time, is_reservation) = match self.target_time {
            Some(target) => (truncate_to_minute(target), true),
            None => (created_at, false),
        };
        Ok(Order {
            id,
            kind: self.kind,
            count: self.count,
            location: self.location,
            note: self.note,
            created_at,
            target_time,
            is_reservation,
        })
    }
}
