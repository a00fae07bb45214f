//! Command-line front end.
//!
//! Reads a TOML config and a JSON snapshot of pending orders, answers
//! what-if queries, and prints JSON on stdout. The snapshot is never
//! written back. Logs go to stderr, filtered by `RUST_LOG`.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use pizza_eta::models::{DriverSource, OrderKind};
use pizza_eta::scheduler::DeliveryEstimator;
use pizza_eta::time::{iso_minute, minute_now};
use pizza_eta::validation::{validate_config, validate_orders};
use pizza_eta::{EtaConfig, EtaError, EtaResult, Order, OrderBook, OrderRequest, Simulator};

#[derive(Parser, Debug)]
#[command(name = "pizza-eta", version, about = "Pizza pickup and delivery ETA simulator")]
struct Cli {
    /// TOML configuration file (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON array of pending orders.
    #[arg(long, global = true)]
    orders: Option<PathBuf>,

    /// Override the configured weather condition.
    #[arg(long, global = true)]
    weather: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate a hypothetical order against the pending snapshot.
    Estimate {
        #[arg(long, value_enum, default_value_t = Kind::Takeout)]
        kind: Kind,
        /// Pizza units.
        #[arg(long, default_value_t = 1)]
        count: u32,
        /// Delivery destination.
        #[arg(long)]
        location: Option<String>,
        /// Reservation target (YYYY-MM-DDTHH:MM). Omit for ASAP.
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<NaiveDateTime>,
        /// Evaluate as of this time instead of the wall clock.
        #[arg(long, value_parser = parse_timestamp)]
        now: Option<NaiveDateTime>,
        /// Fixed driver count, overriding the configured source.
        #[arg(long)]
        drivers: Option<u32>,
    },
    /// Quick delivery quote from a queue length, without oven simulation.
    Quote {
        /// Delivery destination.
        #[arg(long)]
        location: String,
        /// Deliveries already waiting.
        #[arg(long, default_value_t = 0)]
        queue: usize,
        /// Drivers on the road.
        #[arg(long, default_value_t = 3)]
        drivers: u32,
    },
    /// List known delivery locations.
    Locations,
    /// List weather profiles.
    Weather,
    /// Validate the configuration and snapshot.
    Check,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Takeout,
    Delivery,
}

impl From<Kind> for OrderKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Takeout => OrderKind::Takeout,
            Kind::Delivery => OrderKind::Delivery,
        }
    }
}

#[derive(Serialize)]
struct LocationRow<'a> {
    name: &'a str,
    distance_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone: Option<String>,
}

#[derive(Serialize)]
struct CheckReport {
    #[serde(with = "iso_minute")]
    checked_at: NaiveDateTime,
    pending_orders: usize,
    problems: Vec<String>,
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    iso_minute::parse(raw).map_err(|e| format!("expected YYYY-MM-DDTHH:MM: {e}"))
}

fn load_config(cli: &Cli) -> EtaResult<EtaConfig> {
    let mut config = match &cli.config {
        Some(path) => EtaConfig::from_path(path)?,
        None => EtaConfig::default(),
    };
    if let Some(weather) = &cli.weather {
        config.delivery.weather = weather.clone();
    }
    Ok(config)
}

fn load_orders(cli: &Cli) -> EtaResult<Vec<Order>> {
    match &cli.orders {
        Some(path) => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Ok(Vec::new()),
    }
}

fn render_json<T: Serialize>(value: &T) -> EtaResult<String> {
    serde_json::to_string_pretty(value).map_err(EtaError::Output)
}

fn print_json<T: Serialize>(value: &T) -> EtaResult<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

fn run(cli: Cli) -> EtaResult<()> {
    let mut config = load_config(&cli)?;
    let orders = load_orders(&cli)?;

    match cli.command {
        Command::Estimate {
            kind,
            count,
            location,
            at,
            now,
            drivers,
        } => {
            if let Some(count) = drivers {
                config.delivery.drivers = DriverSource::Fixed { count };
            }
            let mut request = OrderRequest::new(kind.into(), count);
            if let Some(location) = location {
                request = request.with_location(location);
            }
            if let Some(target) = at {
                request = request.reserved_for(target);
            }
            let book = OrderBook::from_orders(orders);
            let now = now.unwrap_or_else(minute_now);
            let estimate = Simulator::new(&config).simulate(&book, &request, now)?;
            print_json(&estimate)
        }
        Command::Quote {
            location,
            queue,
            drivers,
        } => {
            let estimator = DeliveryEstimator::new(&config)?;
            let quote = estimator.estimate_standalone(
                &location,
                config.kitchen.prep_minutes,
                queue,
                drivers,
            )?;
            print_json(&quote)
        }
        Command::Locations => {
            let rows: Vec<LocationRow<'_>> = config
                .area
                .locations
                .keys()
                .filter_map(|name| {
                    config.area.resolve(name).map(|r| LocationRow {
                        name: name.as_str(),
                        distance_km: r.distance_km,
                        zone: r.zone_label,
                    })
                })
                .collect();
            print_json(&rows)
        }
        Command::Weather => print_json(&config.weather_profiles),
        Command::Check => {
            let problems = [validate_config(&config), validate_orders(&orders, &config)]
                .into_iter()
                .filter_map(Result::err)
                .flatten()
                .map(|e| format!("{:?}: {}", e.kind, e.message))
                .collect();
            print_json(&CheckReport {
                checked_at: minute_now(),
                pending_orders: orders.len(),
                problems,
            })
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "pizza-eta failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_render_failure_is_not_a_snapshot_error() {
        let mut grid = BTreeMap::new();
        grid.insert((1u8, 2u8), 3u8);
        let err = render_json(&grid).unwrap_err();
        assert!(matches!(err, EtaError::Output(_)));
        assert!(err.to_string().starts_with("could not render output"));
    }

    #[test]
    fn test_render_estimate() {
        let config = EtaConfig::default();
        let now = iso_minute::parse("2026-10-17T18:00").unwrap();
        let estimate = Simulator::new(&config)
            .simulate(&OrderBook::new(), &OrderRequest::takeout(1), now)
            .unwrap();
        let json = render_json(&estimate).unwrap();
        assert!(json.contains("\"completed_at\": \"2026-10-17T18:21\""));
    }

    #[test]
    fn test_cli_parses_estimate() {
        let cli = Cli::try_parse_from([
            "pizza-eta",
            "estimate",
            "--kind",
            "delivery",
            "--location",
            "Kashio",
            "--at",
            "2026-10-17T19:30",
        ])
        .unwrap();
        match cli.command {
            Command::Estimate { kind, at, .. } => {
                assert!(matches!(kind, Kind::Delivery));
                assert_eq!(at, iso_minute::parse("2026-10-17T19:30").ok());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
