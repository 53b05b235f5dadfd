use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::color::HexColorError;
use crate::db::services::{ColorServiceError, DiaryServiceError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("User already exists: {0}")]
    UserAlreadyExists(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    PasswordHashingError(String),
    #[error("JWT creation failed: {0}")]
    TokenCreationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UserAlreadyExists(msg) => (StatusCode::CONFLICT, msg),
            AppError::UserNotFound => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()),
            AppError::PasswordHashingError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Password hashing error: {msg}"),
            ),
            AppError::TokenCreationError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Token creation error: {msg}"),
            ),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error while handling request.");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };
        (status, Json(serde_json::json!({ "error": error_message }))).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<HexColorError> for AppError {
    fn from(err: HexColorError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<ColorServiceError> for AppError {
    fn from(err: ColorServiceError) -> Self {
        let message = err.to_string();
        match err {
            ColorServiceError::DefaultColorLocked => AppError::Forbidden(message),
            ColorServiceError::NotFound => AppError::NotFound(message),
            // A stored row that no longer parses is a server-side problem.
            ColorServiceError::InvalidColor(e) => {
                AppError::InternalServerError(format!("Stored color is corrupt: {e}"))
            }
            ColorServiceError::Database(e) => e.into(),
        }
    }
}

impl From<DiaryServiceError> for AppError {
    fn from(err: DiaryServiceError) -> Self {
        let message = err.to_string();
        match err {
            DiaryServiceError::InvalidLevel(_) | DiaryServiceError::ColorNotOwned => {
                AppError::InvalidInput(message)
            }
            DiaryServiceError::NotFound => AppError::NotFound(message),
            DiaryServiceError::Database(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_service_errors_map_to_statuses() {
        let response = AppError::from(ColorServiceError::DefaultColorLocked).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = AppError::from(ColorServiceError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::from(HexColorError::MalformedCode).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_diary_service_errors_map_to_statuses() {
        let response = AppError::from(DiaryServiceError::InvalidLevel(11)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::from(DiaryServiceError::ColorNotOwned).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::from(DiaryServiceError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
