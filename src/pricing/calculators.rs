//! Core pricing calculation functions.
//!
//! Pure functions for fare math - no network access. The weather observation
//! is looked up by the caller and passed in.
//!
//! Rules run in a fixed order: ride class, pickup zone, weather, time of day.
//! Each rule that fires multiplies the surge and records one [`AppliedRule`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::config::PricingConfig;
use crate::pricing::requests::{RideClass, RideRequest};
use crate::weather::WeatherObservation;

pub const STANDARD_BASE_FARE: Decimal = dec!(15.0);
pub const COMFORT_BASE_FARE: Decimal = dec!(20.0);
pub const BLACK_BASE_FARE: Decimal = dec!(25.0);
pub const HIGH_DEMAND_ZONE_SURCHARGE: Decimal = dec!(5.0);

pub const COMFORT_SURGE: Decimal = dec!(1.2);
pub const BLACK_SURGE: Decimal = dec!(1.5);
pub const HIGH_DEMAND_ZONE_SURGE: Decimal = dec!(1.1);
pub const RAIN_SURGE: Decimal = dec!(1.3);
pub const SNOW_SURGE: Decimal = dec!(1.5);
pub const RUSH_HOUR_SURGE: Decimal = dec!(1.4);

/// Precipitation above this many millimetres per hour counts as rain.
pub const RAIN_THRESHOLD_MM: f64 = 1.0;
/// Snowfall above this many centimetres per hour counts as snow.
pub const SNOW_THRESHOLD_CM: f64 = 0.5;

/// Rush hour is [17:00, 19:00) local time.
pub const RUSH_HOUR_START: u32 = 17;
pub const RUSH_HOUR_END: u32 = 19;

pub const DEFAULT_EXPLANATION: &str = "Price is normal.";

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use surge_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Which pricing rule produced an adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingRule {
    RideClass,
    HighDemandZone,
    Rain,
    Snow,
    RushHour,
}

/// One rule that fired, with the surge factor it contributed
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedRule {
    pub rule: PricingRule,
    pub factor: Decimal,
    pub note: String,
}

/// Result of evaluating every pricing rule for one request
#[derive(Debug, Clone)]
pub struct FareQuote {
    /// Unrounded base fare
    pub base_fare: Decimal,
    /// Unrounded product of all surge factors
    pub surge_multiplier: Decimal,
    pub applied: Vec<AppliedRule>,
}

impl FareQuote {
    fn new() -> Self {
        Self {
            base_fare: STANDARD_BASE_FARE,
            surge_multiplier: Decimal::ONE,
            applied: Vec::new(),
        }
    }

    fn apply(&mut self, rule: PricingRule, factor: Decimal, note: impl Into<String>) {
        self.surge_multiplier *= factor;
        self.applied.push(AppliedRule {
            rule,
            factor,
            note: note.into(),
        });
    }

    /// `base_fare * surge_multiplier`, rounded to cents
    pub fn estimated_price(&self) -> Decimal {
        round_money(self.base_fare * self.surge_multiplier, 2)
    }

    /// Notes of the rules that fired, space separated, or the default
    /// sentence when none did.
    pub fn explanation(&self) -> String {
        if self.applied.is_empty() {
            return DEFAULT_EXPLANATION.to_string();
        }
        self.applied
            .iter()
            .map(|r| r.note.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn fired(&self, rule: PricingRule) -> bool {
        self.applied.iter().any(|r| r.rule == rule)
    }
}

/// Parse an ISO-8601 timestamp, keeping the wall-clock time as written.
///
/// Accepts RFC 3339, offset-less date-times (with `T` or a space), and bare
/// dates (midnight). Anything else yields `None`.
pub fn parse_scheduled_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.naive_local());
        }
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn is_rush_hour(hour: u32) -> bool {
    (RUSH_HOUR_START..RUSH_HOUR_END).contains(&hour)
}

fn apply_ride_class_rule(quote: &mut FareQuote, class: &RideClass) {
    match class {
        RideClass::Comfort => {
            quote.base_fare = COMFORT_BASE_FARE;
            quote.apply(
                PricingRule::RideClass,
                COMFORT_SURGE,
                "Comfort ride has a higher base fare.",
            );
        }
        RideClass::Black => {
            quote.base_fare = BLACK_BASE_FARE;
            quote.apply(
                PricingRule::RideClass,
                BLACK_SURGE,
                "Black ride has a higher base fare.",
            );
        }
        RideClass::Standard | RideClass::Other(_) => {}
    }
}

fn apply_location_rule(quote: &mut FareQuote, pickup_name: Option<&str>, config: &PricingConfig) {
    if pickup_name == Some(config.high_demand_zone.as_str()) {
        quote.base_fare += HIGH_DEMAND_ZONE_SURCHARGE;
        quote.apply(
            PricingRule::HighDemandZone,
            HIGH_DEMAND_ZONE_SURGE,
            format!("High demand in {}.", config.high_demand_zone),
        );
    }
}

fn apply_weather_rules(quote: &mut FareQuote, weather: WeatherObservation) {
    if weather.precipitation_mm > RAIN_THRESHOLD_MM {
        quote.apply(PricingRule::Rain, RAIN_SURGE, "High demand due to rain.");
    }
    if weather.snowfall_cm > SNOW_THRESHOLD_CM {
        quote.apply(PricingRule::Snow, SNOW_SURGE, "High demand due to snow.");
    }
}

fn apply_time_rule(quote: &mut FareQuote, timestamp: &str) {
    let Some(scheduled) = parse_scheduled_time(timestamp) else {
        warn!(timestamp, "Could not parse timestamp, skipping rush hour rule");
        return;
    };

    if is_rush_hour(scheduled.hour()) {
        quote.apply(
            PricingRule::RushHour,
            RUSH_HOUR_SURGE,
            "Rush hour pricing is in effect.",
        );
    }
}

/// Evaluate all pricing rules for a request.
///
/// Never fails: an unparseable timestamp only skips the rush hour rule.
pub fn price_ride(
    request: &RideRequest,
    weather: WeatherObservation,
    config: &PricingConfig,
) -> FareQuote {
    let mut quote = FareQuote::new();

    apply_ride_class_rule(&mut quote, &request.ride_type);
    apply_location_rule(&mut quote, request.pickup_location.name(), config);
    apply_weather_rules(&mut quote, weather);
    apply_time_rule(&mut quote, &request.timestamp);

    debug!(
        ride_type = %request.ride_type,
        base_fare = %quote.base_fare,
        surge = %quote.surge_multiplier,
        rules = quote.applied.len(),
        "Pricing rules evaluated"
    );

    quote
}
