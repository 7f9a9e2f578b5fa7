//! Named-location lookup and great-circle distance.
//!
//! The table is plain data owned by [`crate::config::PricingConfig`], so tests
//! can substitute their own locations without touching process-wide state.

use serde::Deserialize;
use std::collections::HashMap;

/// Mean Earth radius in kilometres (IUGG).
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, serde::Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check latitude is within [-90, 90] and longitude within [-180, 180]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Haversine distance between two coordinates, in kilometres.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let (lat1, lat2) = (from.lat.to_radians(), to.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (to.lon - from.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Location name -> coordinate table with a fixed fallback for unknown names
#[derive(Debug, Clone)]
pub struct LocationTable {
    entries: HashMap<String, Coordinate>,
    fallback: Coordinate,
}

impl LocationTable {
    pub fn new(fallback: Coordinate) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    /// Add or replace a named location.
    pub fn with_location(mut self, name: impl Into<String>, coordinate: Coordinate) -> Self {
        self.entries.insert(name.into(), coordinate);
        self
    }

    /// Exact-match lookup, `None` for unknown names.
    pub fn get(&self, name: &str) -> Option<Coordinate> {
        self.entries.get(name).copied()
    }

    /// Resolve a name, falling back to the table's default coordinate.
    pub fn resolve(&self, name: &str) -> Coordinate {
        self.get(name).unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> Coordinate {
        self.fallback
    }
}

impl Default for LocationTable {
    /// Manhattan-area demo locations; unknown names resolve to City Hall.
    fn default() -> Self {
        Self::new(Coordinate::new(40.7128, -74.0060))
            .with_location("Financial District", Coordinate::new(40.7075, -74.0113))
            .with_location("Times Square", Coordinate::new(40.7580, -73.9855))
            .with_location("Central Park", Coordinate::new(40.7829, -73.9654))
            .with_location("Grand Central", Coordinate::new(40.7527, -73.9772))
            .with_location("SoHo", Coordinate::new(40.7233, -74.0030))
            .with_location("JFK Airport", Coordinate::new(40.6413, -73.7781))
            .with_location("LaGuardia Airport", Coordinate::new(40.7769, -73.8740))
            .with_location("Brooklyn Bridge", Coordinate::new(40.7061, -73.9969))
    }
}
