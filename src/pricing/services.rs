//! Pricing service: coordinates lookup, the weather read, and the rule engine.
//!
//! This is the only pricing code that performs I/O. It never fails; weather
//! and timestamp problems degrade the quote instead.

use chrono::{NaiveDateTime, Timelike, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::config::PricingConfig;
use crate::geo::{haversine_km, Coordinate, LocationTable};
use crate::weather::{fetch_weather, WeatherSource};

use super::calculators::{parse_scheduled_time, price_ride, round_money};
use super::requests::{LocationInput, RideRequest, SCHEMA_VERSION};
use super::responses::PriceResponse;

const MIN_WAIT_MINUTES: u32 = 3;
const MAX_WAIT_MINUTES: u32 = 8;

/// Coordinate of a location the service actually knows.
///
/// Unknown names yield `None`; use [`pickup_coordinate`] when a fallback is wanted.
pub fn known_coordinate(location: &LocationInput, table: &LocationTable) -> Option<Coordinate> {
    match location {
        LocationInput::Named(name) => table.get(name),
        LocationInput::Point(c) => Some(*c),
    }
}

/// Coordinate used for the pickup weather lookup, falling back to the
/// table's default for unknown names.
pub fn pickup_coordinate(location: &LocationInput, table: &LocationTable) -> Coordinate {
    match location {
        LocationInput::Named(name) => table.resolve(name),
        LocationInput::Point(c) => *c,
    }
}

/// Trip distance in km, rounded to two places.
///
/// A client-supplied distance wins; otherwise the great-circle distance when
/// both ends are known.
pub fn trip_distance_km(request: &RideRequest, table: &LocationTable) -> Option<f64> {
    if let Some(d) = request.distance_km {
        return Some(d);
    }

    let from = known_coordinate(&request.pickup_location, table)?;
    let to = known_coordinate(&request.dropoff_location, table)?;
    Some((haversine_km(from, to) * 100.0).round() / 100.0)
}

fn estimate_wait_minutes() -> u32 {
    rand::rng().random_range(MIN_WAIT_MINUTES..=MAX_WAIT_MINUTES)
}

/// Hour the weather is looked up for: the scheduled time, or now when the
/// timestamp cannot be parsed.
fn weather_lookup_time(timestamp: &str) -> NaiveDateTime {
    parse_scheduled_time(timestamp).unwrap_or_else(|| {
        debug!("Using current time for weather lookup");
        Utc::now().naive_utc()
    })
}

/// Price a validated ride request.
pub async fn quote_ride(
    request: &RideRequest,
    weather: &dyn WeatherSource,
    config: &PricingConfig,
) -> PriceResponse {
    let pickup = pickup_coordinate(&request.pickup_location, &config.locations);
    let when = weather_lookup_time(&request.timestamp);

    let observation = fetch_weather(weather, pickup, when.date(), when.hour()).await;
    let quote = price_ride(request, observation, config);

    let response = PriceResponse {
        schema_version: SCHEMA_VERSION,
        base_fare: round_money(quote.base_fare, 2),
        surge_multiplier: round_money(quote.surge_multiplier, 2),
        estimated_price: quote.estimated_price(),
        explanation: quote.explanation(),
        estimated_wait_time_minutes: Some(estimate_wait_minutes()),
        distance_km: trip_distance_km(request, &config.locations),
    };

    info!(
        ride_type = %request.ride_type,
        passengers = request.passenger_count,
        estimated_price = %response.estimated_price,
        surge = %response.surge_multiplier,
        "Quoted ride"
    );

    response
}
