use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub const REUSE_DETECTED_DETAIL: &str =
    "Refresh token reuse detected. All sessions have been revoked. Please log in again.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Registration failed: {0}")]
    RegistrationFailed(String),
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,
    #[error("Refresh token reuse detected")]
    RefreshTokenReused,
    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// JSON:API error object
#[derive(Debug, Serialize, ToSchema)]
pub struct JsonApiError {
    pub status: String,
    pub code: String,
    pub title: String,
    pub detail: String,
}

/// JSON:API error document
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub errors: Vec<JsonApiError>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, &'static str, String) {
        match self {
            AppError::ValidationError(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Validation Error",
                msg.clone(),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized",
                msg.clone(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid Credentials",
                "Invalid email or password.".to_string(),
            ),
            AppError::RegistrationFailed(msg) => (
                StatusCode::BAD_REQUEST,
                "registration_failed",
                "Registration Failed",
                msg.clone(),
            ),
            AppError::InvalidRefreshToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_refresh_token",
                "Invalid Refresh Token",
                "Invalid or expired refresh token.".to_string(),
            ),
            AppError::RefreshTokenReused => (
                StatusCode::UNAUTHORIZED,
                "refresh_token_reused",
                "Refresh Token Reused",
                REUSE_DETECTED_DETAIL.to_string(),
            ),
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal Server Error",
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, title, detail) = self.parts();

        let body = ErrorResponse {
            errors: vec![JsonApiError {
                status: status.as_u16().to_string(),
                code: code.to_string(),
                title: title.to_string(),
                detail,
            }],
        };

        (status, Json(body)).into_response()
    }
}
