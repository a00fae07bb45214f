//! Domain models.
//!
//! Orders flowing through the kitchen plus the static reference data the
//! delivery side reads: zones and locations, weather profiles, and the
//! driver roster.
//!
//! # Domain Mappings
//!
//! | pizza-eta | Scheduling term |
//! |-----------|-----------------|
//! | Order | Job |
//! | Oven slot | Parallel identical machine |
//! | Driver | Human resource with a shift calendar |
//! | Round trip | Resource cycle time |

mod location;
mod order;
mod roster;
mod weather;

pub use location::{LocationEntry, LocationTable, ResolvedLocation, UnknownLocationPolicy, Zone};
pub use order::{Order, OrderId, OrderKind, OrderRequest};
pub use roster::{hh_mm, DriverRoster, DriverSource, DriverSupply, Shift};
pub use weather::{WeatherProfile, WeatherTable};
