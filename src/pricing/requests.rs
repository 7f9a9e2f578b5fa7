//! Request DTOs for pricing API endpoints.

use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;
use validator::{Validate, ValidationError};

use crate::geo::Coordinate;

/// Current request/response schema version
pub const SCHEMA_VERSION: u8 = 3;

/// Service tier requested by the rider.
///
/// Labels other than the three known classes are kept verbatim and priced
/// like `Standard`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RideClass {
    #[default]
    Standard,
    Comfort,
    Black,
    Other(String),
}

impl RideClass {
    pub fn as_str(&self) -> &str {
        match self {
            RideClass::Standard => "Standard",
            RideClass::Comfort => "Comfort",
            RideClass::Black => "Black",
            RideClass::Other(label) => label,
        }
    }
}

impl From<String> for RideClass {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Standard" => RideClass::Standard,
            "Comfort" => RideClass::Comfort,
            "Black" => RideClass::Black,
            _ => RideClass::Other(label),
        }
    }
}

impl fmt::Display for RideClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pickup or dropoff: a named place or a raw coordinate pair
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum LocationInput {
    Named(String),
    Point(Coordinate),
}

impl LocationInput {
    pub fn name(&self) -> Option<&str> {
        match self {
            LocationInput::Named(name) => Some(name),
            LocationInput::Point(_) => None,
        }
    }
}

/// Request to price a ride.
///
/// Locations arrive either as `pickup_location`/`dropoff_location` or, as
/// schema version 2 clients send them, as flat `*_lat`/`*_lon` fields.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(try_from = "RideRequestBody")]
pub struct RideRequest {
    #[validate(range(min = 1, max = 3, message = "unsupported schema_version"))]
    pub schema_version: Option<u8>,

    #[validate(custom(function = "validate_location"))]
    pub pickup_location: LocationInput,

    #[validate(custom(function = "validate_location"))]
    pub dropoff_location: LocationInput,

    /// ISO-8601 pickup time, parsed leniently at pricing time
    pub timestamp: String,

    #[validate(range(min = 1, max = 8, message = "passenger_count must be between 1 and 8"))]
    pub passenger_count: u32,

    pub ride_type: RideClass,

    #[validate(range(min = 0.0, message = "distance_km must not be negative"))]
    pub distance_km: Option<f64>,

    #[validate(range(min = 0.0, message = "duration_minutes must not be negative"))]
    pub duration_minutes: Option<f64>,

    /// Client-side weather label; informational only
    pub weather: Option<String>,
}

/// Wire shape of [`RideRequest`], every field of every schema version
#[derive(Debug, Deserialize)]
struct RideRequestBody {
    #[serde(default)]
    schema_version: Option<u8>,
    #[serde(default)]
    pickup_location: Option<LocationInput>,
    #[serde(default)]
    pickup_lat: Option<f64>,
    #[serde(default)]
    pickup_lon: Option<f64>,
    #[serde(default)]
    dropoff_location: Option<LocationInput>,
    #[serde(default)]
    dropoff_lat: Option<f64>,
    #[serde(default)]
    dropoff_lon: Option<f64>,
    timestamp: String,
    #[serde(default = "default_passenger_count")]
    passenger_count: u32,
    #[serde(default)]
    ride_type: RideClass,
    #[serde(default)]
    distance_km: Option<f64>,
    #[serde(default)]
    duration_minutes: Option<f64>,
    #[serde(default)]
    weather: Option<String>,
}

impl TryFrom<RideRequestBody> for RideRequest {
    type Error = String;

    fn try_from(body: RideRequestBody) -> Result<Self, Self::Error> {
        let pickup_location = location_from_parts(
            "pickup",
            body.pickup_location,
            body.pickup_lat,
            body.pickup_lon,
        )?;
        let dropoff_location = location_from_parts(
            "dropoff",
            body.dropoff_location,
            body.dropoff_lat,
            body.dropoff_lon,
        )?;

        Ok(RideRequest {
            schema_version: body.schema_version,
            pickup_location,
            dropoff_location,
            timestamp: body.timestamp,
            passenger_count: body.passenger_count,
            ride_type: body.ride_type,
            distance_km: body.distance_km,
            duration_minutes: body.duration_minutes,
            weather: body.weather,
        })
    }
}

/// Exactly one of `<side>_location` or the `<side>_lat`/`<side>_lon` pair.
fn location_from_parts(
    side: &str,
    location: Option<LocationInput>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<LocationInput, String> {
    match (location, lat, lon) {
        (Some(location), None, None) => Ok(location),
        (None, Some(lat), Some(lon)) => Ok(LocationInput::Point(Coordinate::new(lat, lon))),
        (Some(_), _, _) => Err(format!(
            "{side}_location cannot be combined with {side}_lat/{side}_lon"
        )),
        (None, None, None) => Err(format!(
            "missing {side}_location (or {side}_lat and {side}_lon)"
        )),
        (None, _, _) => Err(format!("{side}_lat and {side}_lon must be given together")),
    }
}

fn default_passenger_count() -> u32 {
    1
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_location(location: &LocationInput) -> Result<(), ValidationError> {
    match location {
        LocationInput::Named(name) if name.trim().is_empty() => {
            Err(invalid("length", "location name must not be empty"))
        }
        LocationInput::Point(c) if !c.is_valid() => Err(invalid(
            "range",
            "coordinates must be within lat [-90, 90] and lon [-180, 180]",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> RideRequest {
        serde_json::from_value(value).expect("request should deserialize")
    }

    #[test]
    fn test_minimal_request_uses_defaults() {
        let req = request(json!({
            "pickup_location": "Times Square",
            "dropoff_location": "SoHo",
            "timestamp": "2024-11-05T09:30:00"
        }));

        assert_eq!(req.passenger_count, 1);
        assert_eq!(req.ride_type, RideClass::Standard);
        assert_eq!(req.pickup_location.name(), Some("Times Square"));
        assert!(req.distance_km.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_coordinate_locations() {
        let req = request(json!({
            "pickup_location": {"lat": 40.7, "lon": -74.0},
            "dropoff_location": "SoHo",
            "timestamp": "2024-11-05T09:30:00",
            "ride_type": "Black",
            "passenger_count": 3
        }));

        assert_eq!(
            req.pickup_location,
            LocationInput::Point(Coordinate::new(40.7, -74.0))
        );
        assert_eq!(req.pickup_location.name(), None);
        assert_eq!(req.ride_type, RideClass::Black);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_unknown_ride_class_is_kept() {
        let req = request(json!({
            "pickup_location": "SoHo",
            "dropoff_location": "SoHo",
            "timestamp": "x",
            "ride_type": "Helicopter"
        }));
        assert_eq!(req.ride_type, RideClass::Other("Helicopter".to_string()));
        assert_eq!(req.ride_type.to_string(), "Helicopter");
    }

    #[test]
    fn test_ride_class_labels_are_case_sensitive() {
        assert_eq!(
            RideClass::from("comfort".to_string()),
            RideClass::Other("comfort".into())
        );
        assert_eq!(RideClass::from("Comfort".to_string()), RideClass::Comfort);
    }

    #[test]
    fn test_out_of_range_coordinates_fail_validation() {
        let req = request(json!({
            "pickup_location": {"lat": 91.0, "lon": 0.0},
            "dropoff_location": {"lat": 0.0, "lon": -181.0},
            "timestamp": "2024-11-05T09:30:00"
        }));

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("pickup_location"));
        assert!(fields.contains_key("dropoff_location"));
    }

    #[test]
    fn test_passenger_count_range() {
        for (count, ok) in [(0, false), (1, true), (8, true), (9, false)] {
            let req = request(json!({
                "pickup_location": "SoHo",
                "dropoff_location": "SoHo",
                "timestamp": "2024-11-05T09:30:00",
                "passenger_count": count
            }));
            assert_eq!(req.validate().is_ok(), ok, "passenger_count = {count}");
        }
    }

    #[test]
    fn test_empty_location_name_fails_validation() {
        let req = request(json!({
            "pickup_location": "  ",
            "dropoff_location": "SoHo",
            "timestamp": "2024-11-05T09:30:00"
        }));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_negative_distance_fails_validation() {
        let req = request(json!({
            "pickup_location": "SoHo",
            "dropoff_location": "SoHo",
            "timestamp": "2024-11-05T09:30:00",
            "distance_km": -1.0
        }));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_missing_timestamp_fails_to_deserialize() {
        let result: Result<RideRequest, _> = serde_json::from_value(json!({
            "pickup_location": "SoHo",
            "dropoff_location": "SoHo"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_flat_coordinates_normalize_to_points() {
        let req = request(json!({
            "pickup_lat": 40.7128,
            "pickup_lon": -74.006,
            "dropoff_lat": 40.758,
            "dropoff_lon": -73.9855,
            "timestamp": "2024-11-05T18:00:00.000Z"
        }));

        assert_eq!(
            req.pickup_location,
            LocationInput::Point(Coordinate::new(40.7128, -74.006))
        );
        assert_eq!(
            req.dropoff_location,
            LocationInput::Point(Coordinate::new(40.758, -73.9855))
        );
        assert_eq!(req.ride_type, RideClass::Standard);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_flat_coordinates_are_range_checked() {
        let req = request(json!({
            "pickup_lat": 95.0,
            "pickup_lon": -74.006,
            "dropoff_location": "SoHo",
            "timestamp": "2024-11-05T18:00:00"
        }));

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("pickup_location"));
    }

    #[test]
    fn test_location_shapes_are_exclusive() {
        let both: Result<RideRequest, _> = serde_json::from_value(json!({
            "pickup_location": "SoHo",
            "pickup_lat": 40.7,
            "pickup_lon": -74.0,
            "dropoff_location": "SoHo",
            "timestamp": "2024-11-05T18:00:00"
        }));
        assert!(both.unwrap_err().to_string().contains("cannot be combined"));

        let neither: Result<RideRequest, _> = serde_json::from_value(json!({
            "dropoff_location": "SoHo",
            "timestamp": "2024-11-05T18:00:00"
        }));
        assert!(neither.unwrap_err().to_string().contains("missing pickup_location"));

        let half: Result<RideRequest, _> = serde_json::from_value(json!({
            "pickup_location": "SoHo",
            "dropoff_lat": 40.7,
            "timestamp": "2024-11-05T18:00:00"
        }));
        assert!(half.unwrap_err().to_string().contains("must be given together"));
    }
}
