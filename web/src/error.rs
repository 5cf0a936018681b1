//! Error types for web handlers.
//!
//! [`AppError`] bridges lifecycle errors and HTTP responses. It renders the
//! JSON error body
//!
//! ```json
//! { "status": 404, "error": "Not Found", "message": "The requested resource could not be found." }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use resourceful_core::ResourceError;
use resourceful_core::state::INTERNAL_MESSAGE;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn show(State(state): State<AppState>, request: HalRequest) -> WebResult<HalResponse> {
///     let response = ResourceStateMachine::new(GetState::new(&state.store), &request, &state.config)
///         .build()
///         .await?;
///     Ok(response.into())
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for logs)
    code: &'static str,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST")
    }

    /// Create a 400 error for a request that cannot become a model or page.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "VALIDATION_ERROR")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND")
    }

    /// Create a 412 Precondition Failed error.
    #[must_use]
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PRECONDITION_FAILED,
            message.into(),
            "PRECONDITION_FAILED",
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    /// Numeric status code.
    status: u16,
    /// Reason phrase of the status.
    error: &'a str,
    /// Human-readable error message.
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            status: self.status.as_u16(),
            error: self.status.canonical_reason().unwrap_or_default(),
            message: &self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ResourceError> for AppError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound => Self::not_found(err.message()),
            ResourceError::PreconditionFailed => Self::precondition_failed(err.message()),
            ResourceError::Validation(message) => Self::validation(message),
            ResourceError::Internal { .. } => {
                let source = anyhow::Error::new(err);
                Self::internal(INTERNAL_MESSAGE).with_source(source)
            }
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(INTERNAL_MESSAGE).with_source(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_of(error: AppError) -> serde_json::Value {
        let response = error.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn lifecycle_errors_keep_their_status() {
        let cases = [
            (ResourceError::NotFound, StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                ResourceError::PreconditionFailed,
                StatusCode::PRECONDITION_FAILED,
                "PRECONDITION_FAILED",
            ),
            (
                ResourceError::Validation("body missing field `title`".into()),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
        ];
        for (error, status, code) in cases {
            let app = AppError::from(error);
            assert_eq!(app.status(), status);
            assert_eq!(app.code(), code);
        }
    }

    #[tokio::test]
    async fn not_found_renders_the_error_schema() {
        let body = body_of(ResourceError::NotFound.into()).await;
        assert_eq!(
            body,
            serde_json::json!({
                "status": 404,
                "error": "Not Found",
                "message": "The requested resource could not be found.",
            })
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_the_failed_operation() {
        let error = ResourceError::Internal {
            state: "get",
            operation: "load",
        };
        let app = AppError::from(error);
        assert!(std::error::Error::source(&app).is_some());

        let body = body_of(app).await;
        assert_eq!(body["status"], 500);
        assert_eq!(body["message"], INTERNAL_MESSAGE);
        assert!(!body.to_string().contains("load"));
    }
}
