use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No transit route: {0}")]
    NoTransitRoute(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM provider error: {0}")]
    LlmApi(String),

    #[error("Geocoder error: {0}")]
    GeocoderApi(String),

    #[error("Overpass API error: {0}")]
    OverpassApi(String),

    #[error("Routing API error: {0}")]
    RoutingApi(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Wire-format error codes surfaced to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,
    #[serde(rename = "NO_TRANSIT_ROUTE")]
    NoTransitRoute,
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
    #[serde(rename = "API_ERROR")]
    ApiError,
}

/// A suggested client action attached to an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryOption {
    pub label: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl RecoveryOption {
    pub fn retry() -> Self {
        RecoveryOption {
            label: "Retry".to_string(),
            action: "retry".to_string(),
            params: None,
        }
    }

    pub fn change_mode(mode: &str) -> Self {
        RecoveryOption {
            label: format!("Try {}", mode),
            action: "change_mode".to_string(),
            params: Some(json!({ "mode": mode })),
        }
    }
}

/// The error payload inside every failed response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub user_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_options: Option<Vec<RecoveryOption>>,
}

impl AppError {
    /// Map an internal error onto the client-facing payload.
    pub fn to_api_error(&self) -> ApiError {
        match self {
            AppError::InvalidInput(msg) => ApiError {
                code: ErrorCode::InvalidInput,
                message: msg.clone(),
                user_message:
                    "We couldn't find any places matching your request. Try a different location or interests."
                        .to_string(),
                recovery_options: Some(vec![RecoveryOption::retry()]),
            },
            AppError::NoTransitRoute(msg) => ApiError {
                code: ErrorCode::NoTransitRoute,
                message: msg.clone(),
                user_message: "No transit route found. Try walking or driving instead?".to_string(),
                recovery_options: Some(vec![
                    RecoveryOption::change_mode("walking"),
                    RecoveryOption::change_mode("driving"),
                ]),
            },
            AppError::Validation(msg) => ApiError {
                code: ErrorCode::ValidationError,
                message: msg.clone(),
                user_message: "Invalid request format. Please check your input.".to_string(),
                recovery_options: None,
            },
            other => ApiError {
                code: ErrorCode::ApiError,
                message: other.to_string(),
                user_message: "Something went wrong. Please try again later.".to_string(),
                recovery_options: Some(vec![RecoveryOption::retry()]),
            },
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NoTransitRoute(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LlmApi(_)
            | AppError::GeocoderApi(_)
            | AppError::OverpassApi(_)
            | AppError::RoutingApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Cache(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// Convert AppError into the JSON envelope every endpoint uses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InvalidInput(e) => tracing::info!("Invalid input: {}", e),
            AppError::NoTransitRoute(e) => tracing::info!("No transit route: {}", e),
            AppError::Validation(e) => tracing::info!("Validation error: {}", e),
            AppError::Cache(e) => tracing::warn!("Cache error: {}", e),
            other => tracing::error!("{}", other),
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_api_error(),
        }));

        (self.status_code(), body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
