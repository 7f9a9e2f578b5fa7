use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::geo::Coordinate;

use super::{WeatherObservation, WeatherSource};

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Open-Meteo hourly forecast client.
#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    base_url: String,
    http: Client,
}

impl OpenMeteoSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for Open-Meteo")?;

        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    snowfall: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    hourly: OmHourly,
}

#[async_trait]
impl WeatherSource for OpenMeteoSource {
    fn name(&self) -> &'static str {
        "open-meteo"
    }

    async fn observe(
        &self,
        at: Coordinate,
        date: NaiveDate,
        hour: u32,
    ) -> Result<WeatherObservation> {
        let date = date.format("%Y-%m-%d").to_string();

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", at.lat.to_string()),
                ("longitude", at.lon.to_string()),
                ("hourly", "precipitation,snowfall".to_string()),
                ("start_date", date.clone()),
                ("end_date", date),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OmForecastResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")?;

        observation_at_hour(&parsed, hour)
    }
}

/// Pick the `hour`-th entry of the hourly series.
///
/// A missing index is an error; a `null` reading inside the series counts as zero.
fn observation_at_hour(parsed: &OmForecastResponse, hour: u32) -> Result<WeatherObservation> {
    let idx = hour as usize;

    let precipitation = parsed
        .hourly
        .precipitation
        .get(idx)
        .ok_or_else(|| anyhow!("Open-Meteo response has no precipitation for hour {hour}"))?;
    let snowfall = parsed
        .hourly
        .snowfall
        .get(idx)
        .ok_or_else(|| anyhow!("Open-Meteo response has no snowfall for hour {hour}"))?;

    Ok(WeatherObservation::new(
        precipitation.unwrap_or(0.0),
        snowfall.unwrap_or(0.0),
    ))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
