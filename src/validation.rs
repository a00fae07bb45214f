//! Input validation for pending snapshots and configuration.
//!
//! The simulator clamps or rejects bad values as it meets them; these checks
//! report every problem up front so a misconfigured store is caught at load
//! time. Detects:
//! - Duplicate order ids
//! - Orders with zero units or deliveries without a usable destination
//! - Capacities that would be clamped to 1 (ovens, stack, drivers)
//! - Non-positive durations and speeds
//! - Weather conditions without a profile and dangling zone tags

use std::collections::HashSet;

use crate::config::EtaConfig;
use crate::models::{DriverSource, Order, UnknownLocationPolicy};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two orders share the same id.
    DuplicateId,
    /// An order has no units.
    ZeroCount,
    /// A delivery has no destination.
    MissingLocation,
    /// A delivery's destination is not in the location table.
    InvalidLocation,
    /// A capacity resolves to 0 or less and would be clamped to 1.
    InvalidCapacity,
    /// A duration or speed that must be positive is not.
    NonPositiveValue,
    /// The current weather has no profile.
    UnknownWeather,
    /// A location names a zone that does not exist and has no distance.
    DanglingZone,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a pending-order snapshot against the location table.
///
/// Unknown destinations are only reported when the configuration rejects
/// them; with a placeholder distance they are estimable.
pub fn validate_orders(orders: &[Order], config: &EtaConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for order in orders {
        if !ids.insert(order.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate order ID: {}", order.id),
            ));
        }

        if order.count == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroCount,
                format!("Order {} has no units", order.id),
            ));
        }

        if !order.is_delivery() {
            continue;
        }
        match order.location.as_deref() {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::MissingLocation,
                format!("Delivery {} has no location", order.id),
            )),
            Some(name) => {
                let rejects = config.delivery.unknown_location == UnknownLocationPolicy::Reject;
                if rejects && config.area.resolve(name).is_none() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidLocation,
                        format!("Delivery {} references unknown location '{name}'", order.id),
                    ));
                }
            }
        }
    }

    finish(errors)
}

/// Validates configuration values the simulator would otherwise clamp.
pub fn validate_config(config: &EtaConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let kitchen = &config.kitchen;
    let delivery = &config.delivery;

    if kitchen.ovens < 1 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidCapacity,
            format!("Oven count {} is below 1", kitchen.ovens),
        ));
    }
    if delivery.base_stack == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidCapacity,
            "Driver stack size is 0",
        ));
    }
    match &delivery.drivers {
        DriverSource::Fixed { count: 0 } => errors.push(ValidationError::new(
            ValidationErrorKind::InvalidCapacity,
            "Fixed driver count is 0",
        )),
        DriverSource::Roster(roster) => {
            if roster.off_hours_drivers == 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidCapacity,
                    "Off-hours driver count is 0",
                ));
            }
            for shift in roster.shifts.iter().filter(|s| s.drivers == 0) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidCapacity,
                    format!("Shift starting {} has no drivers", shift.start.format("%H:%M")),
                ));
            }
        }
        DriverSource::Fixed { .. } => {}
    }

    let positives = [
        ("bake_minutes", kitchen.bake_minutes),
        ("base_speed_kmh", delivery.base_speed_kmh),
    ];
    let non_negatives = [
        ("prep_minutes", kitchen.prep_minutes),
        ("oven_interval_minutes", kitchen.oven_interval_minutes),
        ("look_ahead_minutes", kitchen.look_ahead_minutes),
    ];
    for (name, value) in positives {
        if !(value > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveValue,
                format!("{name} must be positive, got {value}"),
            ));
        }
    }
    for (name, value) in non_negatives {
        if !(value >= 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveValue,
                format!("{name} must not be negative, got {value}"),
            ));
        }
    }

    for (name, profile) in &config.weather_profiles.0 {
        if !(profile.speed_multiplier > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveValue,
                format!("Weather '{name}' has non-positive speed multiplier"),
            ));
        }
    }
    if config.weather_profiles.profile(&delivery.weather).is_err() {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnknownWeather,
            format!("Current weather '{}' has no profile", delivery.weather),
        ));
    }

    for name in config.area.locations.keys() {
        if config.area.resolve(name).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DanglingZone,
                format!("Location '{name}' has no distance and no known zone"),
            ));
        }
    }

    finish(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DriverRoster, OrderId, OrderKind, OrderRequest, Shift};
    use chrono::NaiveDate;

    fn order(id: u64, request: OrderRequest) -> Order {
        let now = NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        request.into_order(OrderId(id), now).unwrap()
    }

    #[test]
    fn test_valid_orders() {
        let orders = vec![
            order(1, OrderRequest::takeout(2)),
            order(2, OrderRequest::delivery(1, "Kashio")),
        ];
        assert!(validate_orders(&orders, &EtaConfig::default()).is_ok());
    }

    #[test]
    fn test_duplicate_order_id() {
        let orders = vec![
            order(1, OrderRequest::takeout(1)),
            order(1, OrderRequest::takeout(3)),
        ];
        let errors = validate_orders(&orders, &EtaConfig::default()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_snapshot_field_errors() {
        let mut zero = order(1, OrderRequest::takeout(1));
        zero.count = 0;
        let mut homeless = order(2, OrderRequest::delivery(1, "Kashio"));
        homeless.location = None;
        let lost = order(3, OrderRequest::delivery(1, "Atlantis"));
        assert_eq!(lost.kind, OrderKind::Delivery);

        let errors = validate_orders(&[zero, homeless, lost], &EtaConfig::default()).unwrap_err();
        let kinds: Vec<_> = errors.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ValidationErrorKind::ZeroCount,
                ValidationErrorKind::MissingLocation,
                ValidationErrorKind::InvalidLocation,
            ]
        );
    }

    #[test]
    fn test_unknown_location_allowed_with_placeholder() {
        let mut cfg = EtaConfig::default();
        cfg.delivery.unknown_location = UnknownLocationPolicy::DefaultDistance { km: 3.0 };
        let orders = vec![order(1, OrderRequest::delivery(1, "Atlantis"))];
        assert!(validate_orders(&orders, &cfg).is_ok());
    }

    #[test]
    fn test_default_config_valid() {
        assert!(validate_config(&EtaConfig::default()).is_ok());
    }

    #[test]
    fn test_capacity_errors() {
        let mut cfg = EtaConfig::default()
            .with_ovens(0)
            .with_drivers(DriverSource::Roster(
                DriverRoster::new(0).with_shift(Shift::hours(17, 21, 0)),
            ));
        cfg.delivery.base_stack = 0;

        let errors = validate_config(&cfg).unwrap_err();
        let capacity_errors = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidCapacity)
            .count();
        assert_eq!(capacity_errors, 4);
    }

    #[test]
    fn test_value_and_table_errors() {
        let mut cfg = EtaConfig::default().with_weather("hail");
        cfg.kitchen.bake_minutes = 0.0;
        cfg.kitchen.prep_minutes = f64::NAN;
        cfg.area = cfg.area.with_zoned_location("Nowhere", "zone_x");

        let errors = validate_config(&cfg).unwrap_err();
        let has = |kind: ValidationErrorKind| errors.iter().any(|e| e.kind == kind);
        assert!(has(ValidationErrorKind::NonPositiveValue));
        assert!(has(ValidationErrorKind::UnknownWeather));
        assert!(has(ValidationErrorKind::DanglingZone));
        assert!(errors.len() >= 4);
    }
}
