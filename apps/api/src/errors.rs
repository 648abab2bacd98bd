use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::persistence::device::DeviceStoreError;
use crate::persistence::StoreError;
use crate::shop::PurchaseError;
use crate::syllabus::SyllabusError;
use crate::validator::ValidatorError;
use crate::workspace::WorkspaceError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict ({code}): {message}")]
    Conflict { code: &'static str, message: String },

    #[error("Payment required: {0}")]
    InsufficientPoints(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Device store error: {0}")]
    Device(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::PermissionDenied => AppError::PermissionDenied,
            StoreError::InvalidUsername(msg) => AppError::Validation(msg),
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Malformed(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<DeviceStoreError> for AppError {
    fn from(e: DeviceStoreError) -> Self {
        match e {
            DeviceStoreError::QuotaExceeded { .. } => AppError::QuotaExceeded(e.to_string()),
            other => AppError::Device(other.to_string()),
        }
    }
}

impl From<WorkspaceError> for AppError {
    fn from(e: WorkspaceError) -> Self {
        match e {
            WorkspaceError::UnknownItem(_) | WorkspaceError::UnknownTask(_) => {
                AppError::NotFound(e.to_string())
            }
            WorkspaceError::EmptyTaskText => AppError::Validation(e.to_string()),
            WorkspaceError::ValidationRequired(_) => AppError::Conflict {
                code: "VALIDATION_REQUIRED",
                message: e.to_string(),
            },
        }
    }
}

impl From<ValidatorError> for AppError {
    fn from(e: ValidatorError) -> Self {
        match e {
            ValidatorError::EmptyAnswer => AppError::Validation(e.to_string()),
            ValidatorError::NotRequired(_) => AppError::Conflict {
                code: "VALIDATION_NOT_REQUIRED",
                message: e.to_string(),
            },
            ValidatorError::InvalidTransition { .. } => AppError::Conflict {
                code: "VALIDATOR_BUSY",
                message: e.to_string(),
            },
        }
    }
}

impl From<PurchaseError> for AppError {
    fn from(e: PurchaseError) -> Self {
        match e {
            PurchaseError::UnknownItem(_) => AppError::NotFound(e.to_string()),
            PurchaseError::InsufficientPoints { .. } => AppError::InsufficientPoints(e.to_string()),
        }
    }
}

impl From<SyllabusError> for AppError {
    fn from(e: SyllabusError) -> Self {
        AppError::NotFound(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict { code, message } => (StatusCode::CONFLICT, *code, message.clone()),
            AppError::InsufficientPoints(msg) => (
                StatusCode::PAYMENT_REQUIRED,
                "INSUFFICIENT_STAR_POINTS",
                msg.clone(),
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                "PERMISSION_DENIED",
                "Login failed: the profile database refused access. Check the database \
                 permissions for the profiles table."
                    .to_string(),
            ),
            AppError::QuotaExceeded(msg) => {
                tracing::warn!("Device store quota exceeded: {msg}");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "STORAGE_QUOTA_EXCEEDED",
                    "Storage is full. Try a smaller image.".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Device(msg) => {
                tracing::error!("Device store error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DEVICE_STORE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_required_is_conflict() {
        let err: AppError = WorkspaceError::ValidationRequired("Arrays".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_permission_denied_is_forbidden() {
        let err: AppError = StoreError::PermissionDenied.into();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_quota_is_payload_too_large() {
        let err: AppError = DeviceStoreError::QuotaExceeded { size: 10, limit: 5 }.into();
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_unaffordable_purchase_is_payment_required() {
        let err: AppError = PurchaseError::InsufficientPoints { have: 1, need: 2 }.into();
        assert_eq!(err.into_response().status(), StatusCode::PAYMENT_REQUIRED);
    }
}
