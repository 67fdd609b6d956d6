use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

use crate::models::ErrorResponse;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Storage has not (or could not) be connected; nothing was attempted.
    StorageUnavailable,
    /// Database-related errors.
    DatabaseError(sqlx::Error),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Request body over the configured size limit.
    PayloadTooLarge(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StorageUnavailable => write!(f, "Database not connected"),
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::DatabaseError(e) => Some(e),
            AppError::WithContext { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl AppError {
    /// HTTP status for this error. Context wrappers keep their source's status.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::WithContext { source, .. } => source.status_code(),
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// The body is always `{"status": "error", "message": ...}` where the
    /// message is the error's display string. Server-side failures are logged
    /// with full detail first.
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::StorageUnavailable => {
                tracing::warn!("Rejecting request: database not connected");
            }
            AppError::BadRequest(msg) | AppError::PayloadTooLarge(msg) => {
                tracing::debug!("Rejected request body: {}", msg);
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {:?}", context, source);
            }
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
            }
        }

        let message = match &self {
            AppError::BadRequest(msg) | AppError::PayloadTooLarge(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            status: "error".to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}

/// Extension for sqlx::Error to add context
impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::DatabaseError(e)),
            context: context.into(),
        })
    }
}
