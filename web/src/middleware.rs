//! Request tracing.
//!
//! [`trace_layer`] wraps every request in an `http_request` span carrying
//! the method and URI. The `resource_state` span of a state machine nests
//! inside it.
//!
//! # Example
//!
//! ```ignore
//! use resourceful_web::trace_layer;
//!
//! let app = Router::new()
//!     .route("/books/:id", get(show))
//!     .layer(trace_layer());
//! ```

use axum::http::Request;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{MakeSpan, TraceLayer};

/// Span factory of [`trace_layer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpSpan;

impl<B> MakeSpan<B> for HttpSpan {
    fn make_span(&mut self, request: &Request<B>) -> tracing::Span {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}

/// Tracing layer for HAL resource routes.
#[must_use]
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, HttpSpan> {
    TraceLayer::new_for_http().make_span_with(HttpSpan)
}
