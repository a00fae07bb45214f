//! Driver dispatch policies.
//!
//! A dispatch policy answers one question: once a delivery's pizzas come
//! out of the oven, how long until a driver can leave with them? Two
//! policies are provided and configuration selects one explicitly:
//!
//! - [`policies::RoundBased`]: the fleet leaves in rounds of
//!   `fleet_capacity` orders; an order waits for every full round ahead.
//! - [`policies::UnitWait`]: each order ahead costs a fraction of the
//!   average round trip, averaged over the deliveries currently pending.
//!
//! # Usage
//!
//! ```
//! use pizza_eta::dispatching::{DispatchContext, DispatchPolicy};
//! use pizza_eta::dispatching::policies::RoundBased;
//! use pizza_eta::models::WeatherProfile;
//!
//! let policy = RoundBased::new(30.0);
//! let ctx = DispatchContext::new(4, 2, WeatherProfile::clear());
//! assert_eq!(policy.wait_minutes(&ctx), 60.0);
//! ```

mod context;
pub mod policies;

pub use context::DispatchContext;
pub use policies::{DispatchPolicyConfig, RoundBased, UnitWait};

use std::fmt::Debug;

/// A rule for turning fleet load into dispatch wait.
pub trait DispatchPolicy: Send + Sync + Debug {
    /// Policy name (e.g., "round_based").
    fn name(&self) -> &'static str;

    /// Minutes between bake completion and a driver departing.
    ///
    /// Never negative.
    fn wait_minutes(&self, context: &DispatchContext) -> f64;

    /// Policy description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
