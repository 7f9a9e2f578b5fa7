//! Health check route

use axum::Json;
use serde::Serialize;

pub const STATUS_MESSAGE: &str = "Mock pricing server (v3.0) is running!";

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// `GET /`
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: STATUS_MESSAGE,
    })
}
