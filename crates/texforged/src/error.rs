//! Error types for the HTTP surface

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use texforge_core::StoreError;

/// Result type for HTTP handlers
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown route or artifact already consumed
    #[error("not found")]
    NotFound,

    /// Anything else; details are logged, never returned
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::NotFound => (StatusCode::NOT_FOUND, "not found"),
            Error::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        };

        let body = serde_json::json!({
            "status": status.as_u16(),
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) | StoreError::InvalidName(_) => Error::NotFound,
            StoreError::Io(e) => Error::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_http_errors() {
        assert!(matches!(
            Error::from(StoreError::NotFound("a.pdf".into())),
            Error::NotFound
        ));
        assert!(matches!(
            Error::from(StoreError::Io(std::io::Error::other("disk"))),
            Error::Internal(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
