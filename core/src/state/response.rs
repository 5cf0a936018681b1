use crate::hal::{HAL_MEDIA_TYPE, ResourceObject};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

/// The response under construction, threaded through the pipeline.
///
/// Each step takes the draft by value and returns the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDraft {
    document: ResourceObject,
    headers: HeaderMap,
}

impl ResponseDraft {
    /// Start a draft around `document`.
    #[must_use]
    pub fn new(document: ResourceObject) -> Self {
        Self::from_parts(document, HeaderMap::new())
    }

    /// Reassemble a draft.
    #[must_use]
    pub const fn from_parts(document: ResourceObject, headers: HeaderMap) -> Self {
        Self { document, headers }
    }

    /// The document so far.
    #[must_use]
    pub const fn document(&self) -> &ResourceObject {
        &self.document
    }

    /// The headers so far.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Set a header, replacing earlier values.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Transform the document.
    #[must_use]
    pub fn map_document<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ResourceObject) -> ResourceObject,
    {
        self.document = f(self.document);
        self
    }

    /// Split into document and headers.
    #[must_use]
    pub fn into_parts(self) -> (ResourceObject, HeaderMap) {
        (self.document, self.headers)
    }
}

/// A finished response: status, headers and an optional HAL document.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<ResourceObject>,
}

impl ResourceResponse {
    /// Create a response. `Content-Type` is set to the HAL media type.
    #[must_use]
    pub fn new(status: StatusCode, mut headers: HeaderMap, body: Option<ResourceObject>) -> Self {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(HAL_MEDIA_TYPE));
        Self {
            status,
            headers,
            body,
        }
    }

    /// `304 Not Modified` with an empty body.
    #[must_use]
    pub fn not_modified(headers: HeaderMap) -> Self {
        Self::new(StatusCode::NOT_MODIFIED, headers, None)
    }

    /// Status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header as text.
    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The document, absent for bodiless responses.
    #[must_use]
    pub const fn body(&self) -> Option<&ResourceObject> {
        self.body.as_ref()
    }

    /// Split into status, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Option<ResourceObject>) {
        (self.status, self.headers, self.body)
    }
}
