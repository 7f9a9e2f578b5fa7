//! Mock ride pricing service.
//!
//! Prices a ride from its class, pickup zone, live weather at the pickup and
//! time of day. Served over HTTP with axum; see [`app`] for the routes.

pub mod config;
pub mod error;
pub mod geo;
pub mod pricing;
pub mod routes;
pub mod weather;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::PricingConfig;
use crate::weather::WeatherSource;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pricing: Arc<PricingConfig>,
    pub weather: Arc<dyn WeatherSource>,
}

impl AppState {
    pub fn new(pricing: PricingConfig, weather: Arc<dyn WeatherSource>) -> Self {
        Self {
            pricing: Arc::new(pricing),
            weather,
        }
    }
}

/// Build the application router.
///
/// CORS is wide open: the service backs a browser prototype served from
/// another origin.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health::root))
        .merge(pricing::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
