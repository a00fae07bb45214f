//! Kitchen and delivery scheduling.
//!
//! The pipeline behind every ETA:
//!
//! ```text
//! orders ─▶ Prioritizer ─▶ OvenAllocator ─▶ DeliveryEstimator ─▶ Estimate
//!           (queue order)   (bake finish)    (wait + travel)
//! ```
//!
//! `Simulator` orchestrates the three stages over a pending snapshot plus
//! hypothetical orders.
//!
//! # Algorithm
//!
//! The oven stage is a greedy list scheduler on identical parallel
//! machines: units are taken in priority order and each goes to the
//! earliest-available slot.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 5
//! - Graham (1969), "Bounds on Multiprocessing Timing Anomalies"

mod delivery;
mod oven;
mod prioritizer;
mod simulator;

pub use delivery::{
    fleet_capacity, per_driver_capacity, travel_minutes, DeliveryBreakdown, DeliveryEstimator,
    StandaloneEstimate,
};
pub use oven::{BakeTask, OvenAllocator, OvenPlan, UnitPlacement};
pub use prioritizer::{Prioritizer, QueuedTask};
pub use simulator::{Estimate, Simulator, CONGESTION_GRACE_MINUTES};
