//! Kitchen and delivery ETA simulator.
//!
//! Estimates when a pizza order will be ready for pickup or delivered,
//! given the orders already pending, the ovens, and the driver fleet.
//! Reservations join the oven queue a fixed look-ahead before their
//! target and can cut in line ahead of ASAP orders.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Order`, `OrderRequest`, `LocationTable`,
//!   `WeatherTable`, `DriverRoster`
//! - **`scheduler`**: `Prioritizer`, `OvenAllocator`, `DeliveryEstimator`,
//!   and the `Simulator` that chains them
//! - **`dispatching`**: Dispatch-wait policies (round-based, unit-wait)
//! - **`store`**: The pending-order book
//! - **`config`**: TOML-backed configuration with defaults
//! - **`validation`**: Snapshot and configuration checks
//!
//! # Architecture
//!
//! Every simulation is a pure function of a pending snapshot, hypothetical
//! orders, configuration, and one sampled "now". Only
//! `Simulator::commit` and `OrderBook::complete_order` mutate state.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Graham (1969), "Bounds on Multiprocessing Timing Anomalies"

pub mod config;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod time;
pub mod validation;

pub use config::EtaConfig;
pub use error::{EtaError, EtaResult};
pub use models::{Order, OrderId, OrderKind, OrderRequest};
pub use scheduler::{Estimate, Simulator};
pub use store::OrderBook;
