//! Runtime configuration loaded from the environment (and `.env` via dotenvy).

use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::geo::LocationTable;
use crate::weather::{
    open_meteo::DEFAULT_FORECAST_URL, FixedWeather, OpenMeteoSource, WeatherSource,
};

pub const DEFAULT_HIGH_DEMAND_ZONE: &str = "Financial District";

/// Which weather backend to wire into the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherProviderKind {
    OpenMeteo,
    /// No network calls, every lookup reports clear weather
    Offline,
}

impl TryFrom<&str> for WeatherProviderKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "open-meteo" | "openmeteo" => Ok(WeatherProviderKind::OpenMeteo),
            "offline" | "none" => Ok(WeatherProviderKind::Offline),
            _ => Err(anyhow!(
                "Unknown weather provider '{value}'. Supported providers: open-meteo, offline."
            )),
        }
    }
}

/// Inputs of the pricing rules that vary by deployment
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Pickup name that triggers the location surcharge
    pub high_demand_zone: String,
    pub locations: LocationTable,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            high_demand_zone: DEFAULT_HIGH_DEMAND_ZONE.to_string(),
            locations: LocationTable::default(),
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub weather_provider: WeatherProviderKind,
    pub weather_api_url: String,
    pub weather_timeout: Duration,
    pub pricing: PricingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            weather_provider: WeatherProviderKind::OpenMeteo,
            weather_api_url: DEFAULT_FORECAST_URL.to_string(),
            weather_timeout: Duration::from_secs(3),
            pricing: PricingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(host) = lookup("HOST") {
            cfg.host = host;
        }

        if let Some(port) = lookup("PORT") {
            cfg.port = port
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{port}'"))?;
        }

        if let Some(provider) = lookup("WEATHER_PROVIDER") {
            cfg.weather_provider = WeatherProviderKind::try_from(provider.as_str())?;
        }

        if let Some(url) = lookup("WEATHER_API_URL") {
            cfg.weather_api_url = url;
        }

        if let Some(secs) = lookup("WEATHER_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| {
                    format!("WEATHER_TIMEOUT_SECS must be whole seconds, got '{secs}'")
                })?;
            if secs == 0 {
                return Err(anyhow!("WEATHER_TIMEOUT_SECS must be greater than zero"));
            }
            cfg.weather_timeout = Duration::from_secs(secs);
        }

        if let Some(zone) = lookup("HIGH_DEMAND_ZONE") {
            cfg.pricing.high_demand_zone = zone;
        }

        Ok(cfg)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }

    /// Construct the configured weather source.
    pub fn weather_source(&self) -> Result<Arc<dyn WeatherSource>> {
        let source: Arc<dyn WeatherSource> = match self.weather_provider {
            WeatherProviderKind::OpenMeteo => Arc::new(OpenMeteoSource::new(
                self.weather_api_url.clone(),
                self.weather_timeout,
            )?),
            WeatherProviderKind::Offline => Arc::new(FixedWeather::default()),
        };

        Ok(source)
    }
}
