//! Weather lookups for demand-based surge pricing.
//!
//! Providers implement [`WeatherSource`] and are free to fail; callers go
//! through [`fetch_weather`], which turns every failure into a dry, snow-free
//! observation so that pricing never errors because of weather.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::geo::Coordinate;

pub mod open_meteo;

pub use open_meteo::OpenMeteoSource;

/// Hourly precipitation and snowfall at a location
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeatherObservation {
    pub precipitation_mm: f64,
    pub snowfall_cm: f64,
}

impl WeatherObservation {
    pub const CLEAR: WeatherObservation = WeatherObservation {
        precipitation_mm: 0.0,
        snowfall_cm: 0.0,
    };

    pub fn new(precipitation_mm: f64, snowfall_cm: f64) -> Self {
        Self {
            precipitation_mm,
            snowfall_cm,
        }
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Observation for `hour` (0-23, local to the location) on `date`.
    async fn observe(
        &self,
        at: Coordinate,
        date: NaiveDate,
        hour: u32,
    ) -> anyhow::Result<WeatherObservation>;
}

/// Best-effort weather lookup.
///
/// Never fails: any provider error is logged and replaced by
/// [`WeatherObservation::CLEAR`].
pub async fn fetch_weather(
    source: &dyn WeatherSource,
    at: Coordinate,
    date: NaiveDate,
    hour: u32,
) -> WeatherObservation {
    match source.observe(at, date, hour).await {
        Ok(observation) => {
            debug!(
                provider = source.name(),
                precipitation_mm = observation.precipitation_mm,
                snowfall_cm = observation.snowfall_cm,
                "Weather observation received"
            );
            sanitize(observation)
        }
        Err(e) => {
            warn!(
                provider = source.name(),
                lat = at.lat,
                lon = at.lon,
                %date,
                hour,
                "Weather lookup failed, assuming no precipitation: {:#}",
                e
            );
            WeatherObservation::CLEAR
        }
    }
}

/// Negative or non-finite readings count as zero.
fn sanitize(observation: WeatherObservation) -> WeatherObservation {
    let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    WeatherObservation {
        precipitation_mm: clean(observation.precipitation_mm),
        snowfall_cm: clean(observation.snowfall_cm),
    }
}

/// Source that always reports the same observation.
///
/// Used for offline development and as a test double.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedWeather(pub WeatherObservation);

#[async_trait]
impl WeatherSource for FixedWeather {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn observe(
        &self,
        _at: Coordinate,
        _date: NaiveDate,
        _hour: u32,
    ) -> anyhow::Result<WeatherObservation> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Unreachable;

    #[async_trait]
    impl WeatherSource for Unreachable {
        fn name(&self) -> &'static str {
            "unreachable"
        }

        async fn observe(
            &self,
            _at: Coordinate,
            _date: NaiveDate,
            _hour: u32,
        ) -> anyhow::Result<WeatherObservation> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn some_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_weather_passes_through_observation() {
        let source = FixedWeather(WeatherObservation::new(2.5, 0.7));
        let obs = fetch_weather(&source, Coordinate::new(40.7, -74.0), some_day(), 9).await;
        assert_eq!(obs, WeatherObservation::new(2.5, 0.7));
    }

    #[tokio::test]
    async fn test_fetch_weather_failure_degrades_to_clear() {
        let obs = fetch_weather(&Unreachable, Coordinate::new(40.7, -74.0), some_day(), 9).await;
        assert_eq!(obs, WeatherObservation::CLEAR);
    }

    #[tokio::test]
    async fn test_fetch_weather_discards_nonsense_values() {
        let source = FixedWeather(WeatherObservation::new(f64::NAN, -3.0));
        let obs = fetch_weather(&source, Coordinate::new(40.7, -74.0), some_day(), 9).await;
        assert_eq!(obs, WeatherObservation::CLEAR);
    }
}
