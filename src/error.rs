//! Error taxonomy.
//!
//! Every condition here is local and recoverable; nothing in the core aborts.

use thiserror::Error;

use crate::models::OrderId;

/// Result alias for fallible operations.
pub type EtaResult<T> = Result<T, EtaError>;

/// Errors surfaced by the order book, tables and simulator.
#[derive(Debug, Error)]
pub enum EtaError {
    /// Destination is not in the location table and the policy rejects it.
    #[error("unknown delivery location '{0}'")]
    InvalidLocation(String),

    /// A delivery order was built without a destination.
    #[error("delivery orders require a location")]
    MissingLocation,

    /// An order was built with zero pizza units.
    #[error("orders must contain at least one unit")]
    ZeroCount,

    /// `simulate_batch` was called with nothing to report on.
    #[error("no hypothetical order to estimate")]
    EmptyResult,

    /// The order id is not in the pending set.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// Every order id has been issued.
    #[error("order ids exhausted")]
    IdsExhausted,

    /// Weather condition has no profile.
    #[error("unknown weather condition '{0}'")]
    UnknownWeather(String),

    /// A capacity resolved to zero or less.
    #[error("{what} resolved to {value}, must be at least 1")]
    InvalidCapacity {
        /// Which capacity was misconfigured.
        what: &'static str,
        /// The configured value.
        value: i64,
    },

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Pending-order snapshot could not be parsed.
    #[error("invalid order snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A result could not be rendered as JSON.
    #[error("could not render output: {0}")]
    Output(serde_json::Error),

    /// Configuration or snapshot file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
