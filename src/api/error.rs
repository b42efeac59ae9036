use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::forecast::{ForecastError, ForecastPoint};
use crate::services::ServiceError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Body returned when no forecast could be produced.
#[derive(Debug, Serialize, ToSchema)]
pub struct ForecastErrorResponse {
    pub error: String,
    pub forecast: Vec<ForecastPoint>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

impl ApiError {
    pub fn forbidden(detail: &str) -> Self {
        ApiError::Forbidden(detail.to_string())
    }

    pub fn credentials() -> Self {
        ApiError::Unauthorized("Could not validate credentials".to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(detail) => ApiError::NotFound(detail),
            ServiceError::Forbidden(detail) => ApiError::Forbidden(detail),
            ServiceError::Invalid(detail) => ApiError::BadRequest(detail),
            ServiceError::Unauthorized(detail) => ApiError::Unauthorized(detail),
            ServiceError::Auth(e) => {
                error!("Authentication backend failure: {}", e);
                ApiError::Internal
            }
            ServiceError::Db(e) => {
                error!("Database error: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Forecast(e) => {
                let status = match e {
                    ForecastError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                    ForecastError::GenerationFailed(_) | ForecastError::Validation(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                };
                warn!("Forecast unavailable: {}", e);
                let body = ForecastErrorResponse {
                    error: e.to_string(),
                    forecast: Vec::new(),
                    recommendations: Vec::new(),
                };
                return (status, Json(body)).into_response();
            }
            ApiError::Unauthorized(detail) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    Json(ErrorResponse { detail }),
                )
                    .into_response();
            }
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Forbidden(detail) => (StatusCode::FORBIDDEN, detail),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
