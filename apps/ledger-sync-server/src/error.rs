//! Error types for the Ledger sync server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::datetime::DateTimeError;
use crate::locale::{Locale, Message};

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid value {value:?} for parameter {name}")]
    InvalidArgument { name: String, value: String },

    #[error(transparent)]
    InvalidDate(#[from] DateTimeError),

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Unsupported media type")]
    UnsupportedMediaType,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn invalid_argument(name: &str, value: impl Into<String>) -> Self {
        AppError::InvalidArgument {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidArgument { .. }
            | AppError::InvalidDate(_)
            | AppError::InvalidTimezone(_)
            | AppError::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The user-facing message, before localization
    pub fn message(&self) -> Message {
        match self {
            AppError::NotFound(what) => Message::NotFound { what: what.clone() },
            AppError::InvalidArgument { name, value } => Message::InvalidParameter {
                name: name.clone(),
                value: value.clone(),
            },
            AppError::InvalidDate(e) => Message::InvalidDate {
                value: e.input().to_string(),
            },
            AppError::InvalidTimezone(value) => Message::InvalidTimezone {
                value: value.clone(),
            },
            AppError::UnsupportedLanguage(value) => Message::UnsupportedLanguage {
                value: value.clone(),
            },
            AppError::Unauthenticated => Message::Unauthenticated,
            AppError::UnsupportedMediaType => Message::UnsupportedMediaType,
            AppError::Internal(_) | AppError::Database(_) => Message::Internal,
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// An error response whose message has not been localized yet.
///
/// Attached to the response extensions so the request-context middleware
/// can re-render the body in the negotiated locale.
#[derive(Debug, Clone)]
pub struct PendingError {
    pub status: StatusCode,
    pub message: Message,
    pub details: Option<String>,
}

impl PendingError {
    pub fn render(&self, locale: Locale) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.canonical_reason().unwrap_or("Error"),
            message: self.message.render(locale),
            details: self.details.clone(),
        });

        let mut response = (self.status, body).into_response();
        response.extensions_mut().insert(self.clone());
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Database(e) => tracing::error!("Database error: {}", e),
            other => tracing::debug!("Request rejected: {}", other),
        }

        let pending = PendingError {
            status: self.status(),
            message: self.message(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        pending.render(Locale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(DateTimeError::InvalidFormat("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::UnsupportedMediaType.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_carries_pending_error() {
        let response = AppError::invalid_argument("limit", "0").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let pending = response.extensions().get::<PendingError>().unwrap();
        assert_eq!(
            pending.message,
            Message::InvalidParameter {
                name: "limit".to_string(),
                value: "0".to_string()
            }
        );
    }

    #[test]
    fn test_internal_details_are_not_in_message() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert_eq!(err.message().render(Locale::En), "An internal error occurred.");
    }
}
