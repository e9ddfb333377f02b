//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::file::UploadError;
use crate::identity::IdentityError;
use crate::services::{GeneratorError, MenuError};
use crate::store::StoreError;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("upstream error: {0}")]
    BadGateway(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SlugConflict(slug) => {
                AppError::Conflict(format!("slug {slug:?} is already taken"))
            }
            StoreError::Constraint(detail) => {
                tracing::warn!(detail = %detail, "store constraint violation");
                AppError::Conflict("menu conflicts with existing data".to_string())
            }
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Unavailable(msg) => AppError::Unavailable(msg),
        }
    }
}

impl From<MenuError> for AppError {
    fn from(err: MenuError) -> Self {
        match err {
            MenuError::Validation(msg) => AppError::BadRequest(msg),
            MenuError::NotFound => AppError::NotFound,
            MenuError::DataAccess(e) => e.into(),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::EmailTaken => AppError::Conflict(err.to_string()),
            IdentityError::InvalidEmail | IdentityError::WeakPassword => {
                AppError::BadRequest(err.to_string())
            }
            IdentityError::Database(e) => AppError::Database(e),
            IdentityError::Internal(e) => AppError::Internal(e),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Empty => AppError::BadRequest(err.to_string()),
            UploadError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            UploadError::UnsupportedType(_) | UploadError::Undecodable(_) => {
                AppError::UnsupportedMediaType(err.to_string())
            }
            UploadError::Processing(e) => AppError::Internal(e.context("failed to process image")),
            UploadError::Storage(e) => AppError::Internal(e.context("failed to store image")),
        }
    }
}

impl From<GeneratorError> for AppError {
    fn from(err: GeneratorError) -> Self {
        tracing::warn!(error = %err, "menu generation failed");
        AppError::BadGateway("menu generation failed".to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details are logged, never returned.
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal server error");
                "internal server error".to_string()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
