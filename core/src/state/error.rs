//! Error types of the lifecycle pipeline.

use http::StatusCode;
use thiserror::Error;

/// Message sent with [`ResourceError::Internal`]. Storage details never reach the client.
pub const INTERNAL_MESSAGE: &str = "An unexpected error occurred.";

/// Terminal outcome of a state machine that is not a success response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The load step produced no model.
    #[error("The requested resource could not be found.")]
    NotFound,

    /// A conditional write or delete was made against a stale copy.
    #[error("You do not know the current state of the specified resource.")]
    PreconditionFailed,

    /// The request could not be turned into a model or page.
    #[error("{0}")]
    Validation(String),

    /// A persistence call or another internal step failed.
    #[error("{state} failed during {operation}")]
    Internal {
        /// State machine name
        state: &'static str,
        /// Failed operation (`load`, `save`, ...)
        operation: &'static str,
    },
}

impl ResourceError {
    /// HTTP status this outcome maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound => "The requested resource could not be found.",
            Self::PreconditionFailed => {
                "You do not know the current state of the specified resource."
            }
            Self::Validation(message) => message,
            Self::Internal { .. } => INTERNAL_MESSAGE,
        }
    }
}

/// Failure reported by a persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database rejected or failed the operation.
    #[error("Database error: {0}")]
    Database(String),

    /// A model could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
