//! Request extraction.
//!
//! [`HalRequest`] turns an axum request into the [`ResourceRequest`] the
//! state machines consume: method, headers, query, path parameters, JSON
//! body and the resolved URLs.

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts, OriginalUri, Path, Query, Request, rejection::PathRejection},
    http::{header::HOST, request::Parts},
};
use resourceful_core::{HalConfig, ResourceRequest};
use serde_json::Value;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Header consulted for the scheme when no base URL is configured.
pub const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// A [`ResourceRequest`] extracted from an axum request.
///
/// The router state must provide an `Arc<HalConfig>` through [`FromRef`].
/// When the config has no base URL, the base is derived from the scheme
/// (`X-Forwarded-Proto`, defaulting to `http`) and the `Host` header. The full
/// URL is the base followed by the path and query the client requested.
///
/// An empty body becomes `null`. A body that is not JSON is rejected with
/// `400` before any state machine runs.
///
/// # Example
///
/// ```ignore
/// async fn show(State(state): State<AppState>, request: HalRequest) -> WebResult<HalResponse> {
///     let response = ResourceStateMachine::new(GetState::new(&state.store), &request, &state.config)
///         .build()
///         .await?;
///     Ok(response.into())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HalRequest(pub ResourceRequest);

impl HalRequest {
    /// The extracted request.
    #[must_use]
    pub fn into_inner(self) -> ResourceRequest {
        self.0
    }
}

impl Deref for HalRequest {
    type Target = ResourceRequest;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequest<S> for HalRequest
where
    S: Send + Sync,
    Arc<HalConfig>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<HalConfig>::from_ref(state);
        let (mut parts, body) = req.into_parts();

        let params = match Path::<HashMap<String, String>>::from_request_parts(&mut parts, state).await {
            Ok(Path(params)) => params,
            Err(PathRejection::MissingPathParams(_)) => HashMap::new(),
            Err(rejection) => return Err(AppError::bad_request(rejection.body_text())),
        };
        let Query(query) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        let base_url = base_url(&config, &parts);
        let full_url = format!("{base_url}{}", path_and_query(&parts));

        let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|error| AppError::bad_request(format!("body {error}")))?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|error| AppError::validation(format!("body {error}")))?
        };

        tracing::trace!(method = %parts.method, url = %full_url, "Extracted resource request");

        let request = ResourceRequest::new(parts.method, full_url, base_url)
            .with_headers(parts.headers)
            .with_query_map(query)
            .with_params(params)
            .with_body(body);
        Ok(Self(request))
    }
}

fn base_url(config: &HalConfig, parts: &Parts) -> String {
    if let Some(base) = config.base_url() {
        return base.to_string();
    }
    let scheme = parts
        .headers
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .or_else(|| parts.uri.scheme_str())
        .unwrap_or("http");
    let host = parts
        .headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| parts.uri.authority().map(http::uri::Authority::as_str))
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

// Nested routers strip their prefix from `parts.uri`; the original URI keeps it.
fn path_and_query(parts: &Parts) -> &str {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);
    uri.path_and_query().map_or("/", http::uri::PathAndQuery::as_str)
}
