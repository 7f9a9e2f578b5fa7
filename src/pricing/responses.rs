//! Response DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

/// Response for `POST /get_price`
#[derive(Debug, Clone, Serialize)]
pub struct PriceResponse {
    pub schema_version: u8,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_fare: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub surge_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_price: Decimal,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_wait_time_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}
