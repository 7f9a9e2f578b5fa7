//! HTTP handlers for the pricing API.

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::AppState;

use super::requests::RideRequest;
use super::responses::PriceResponse;
use super::services::quote_ride;

pub fn router() -> Router<AppState> {
    Router::new().route("/get_price", post(get_price))
}

/// Price a ride. Validation runs before any pricing rule.
pub async fn get_price(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RideRequest>, JsonRejection>,
) -> Result<Json<PriceResponse>> {
    let Json(request) = payload?;
    request.validate()?;

    let span = tracing::info_span!("quote", request_id = %Uuid::new_v4());
    let response = quote_ride(&request, state.weather.as_ref(), &state.pricing)
        .instrument(span)
        .await;

    Ok(Json(response))
}
