//! Error handling for the application

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::ValidationErrors;

/// A single rejected request field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error body returned to API clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Request validation failed")]
    Validation(Vec<FieldError>),

    #[error("Malformed request: {0}")]
    BadRequest(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' check", e.code)),
                })
            })
            .collect();
        // HashMap iteration order is arbitrary
        fields.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));
        AppError::Validation(fields)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(fields) => {
                tracing::debug!("Rejected request with {} invalid field(s)", fields.len());
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse {
                        error_type: "validation_error".to_string(),
                        message: "Request validation failed".to_string(),
                        details: serde_json::to_value(fields).ok(),
                    },
                )
            }
            AppError::BadRequest(msg) => {
                tracing::debug!("Malformed request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error_type: "bad_request".to_string(),
                        message: msg,
                        details: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
