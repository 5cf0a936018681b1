//! Response conversion.

use crate::error::AppError;
use axum::{
    body::Body,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use resourceful_core::ResourceResponse;
use resourceful_core::state::INTERNAL_MESSAGE;

/// A [`ResourceResponse`] sent through axum.
///
/// The HAL document is serialized as the body. Responses without a document
/// (`304 Not Modified`) go out with an empty body and no `Content-Type`.
#[derive(Debug, Clone)]
pub struct HalResponse(pub ResourceResponse);

impl From<ResourceResponse> for HalResponse {
    fn from(response: ResourceResponse) -> Self {
        Self(response)
    }
}

impl IntoResponse for HalResponse {
    fn into_response(self) -> Response {
        let (status, mut headers, document) = self.0.into_parts();
        let body = match document {
            Some(document) => match serde_json::to_vec(&document) {
                Ok(bytes) => Body::from(bytes),
                Err(error) => {
                    return AppError::internal(INTERNAL_MESSAGE)
                        .with_source(error.into())
                        .into_response();
                }
            },
            None => {
                headers.remove(CONTENT_TYPE);
                Body::empty()
            }
        };
        (status, headers, body).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use http::header::ETAG;
    use http::{HeaderMap, HeaderValue, StatusCode};
    use resourceful_core::{HAL_MEDIA_TYPE, ResourceObject};

    #[tokio::test]
    async fn documents_are_sent_as_hal_json() {
        let mut document = ResourceObject::new("/books/1");
        document.set_property("title", "Dune");
        let response = HalResponse::from(ResourceResponse::new(StatusCode::CREATED, HeaderMap::new(), Some(document)))
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], HAL_MEDIA_TYPE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["_links"]["self"]["href"], "/books/1");
    }

    #[tokio::test]
    async fn not_modified_has_no_body() {
        let mut headers = HeaderMap::new();
        headers.insert(ETAG, HeaderValue::from_static("\"v1\""));
        let response = HalResponse(ResourceResponse::not_modified(headers)).into_response();

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers()[ETAG], "\"v1\"");
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}
