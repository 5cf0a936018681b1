use crate::builder::{HalContext, absolute_url};
use crate::config::HalConfig;
use crate::preconditions::PreconditionPair;
use http::header::AsHeaderName;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::Value;
use std::collections::HashMap;

/// A parsed HTTP request as the state machines see it.
///
/// The transport resolves `full_url` (scheme, host, path and query of the
/// current request) and `base_url` (where relative hrefs resolve).
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    method: Method,
    headers: HeaderMap,
    query: HashMap<String, String>,
    params: HashMap<String, String>,
    body: Value,
    full_url: String,
    base_url: String,
}

impl ResourceRequest {
    /// Create a request without headers, parameters or body.
    #[must_use]
    pub fn new(method: Method, full_url: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            method,
            headers: HeaderMap::new(),
            query: HashMap::new(),
            params: HashMap::new(),
            body: Value::Null,
            full_url: full_url.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace all headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Replace all query parameters.
    #[must_use]
    pub fn with_query_map(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Add a path parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replace all path parameters.
    #[must_use]
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Set the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// All headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header as text, if present and valid.
    #[must_use]
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// A query parameter.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// A path parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The JSON body, `Null` when absent.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Full URL of the current request.
    #[must_use]
    pub fn full_url(&self) -> &str {
        &self.full_url
    }

    /// Base URL without trailing `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `href` against the base URL.
    #[must_use]
    pub fn absolute_url(&self, href: &str) -> String {
        absolute_url(&self.base_url, href)
    }

    /// Builder context for this request.
    #[must_use]
    pub fn hal<'a>(&'a self, config: &HalConfig) -> HalContext<'a> {
        HalContext::new(&self.base_url, config.hypertext_cache_pattern)
    }

    /// Evaluate the precondition pair matching the method.
    ///
    /// `GET`/`HEAD` use the read pair, `PUT`/`PATCH`/`DELETE` the write pair.
    /// Other methods are never satisfied.
    #[must_use]
    pub fn evaluate_preconditions(&self, modified_at: Option<i64>, entity_tag: Option<&str>) -> bool {
        let pair = if self.method == Method::GET || self.method == Method::HEAD {
            PreconditionPair::Read
        } else if self.method == Method::PUT
            || self.method == Method::PATCH
            || self.method == Method::DELETE
        {
            PreconditionPair::Write
        } else {
            return false;
        };
        pair.evaluate(&self.headers, entity_tag, modified_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{IF_MATCH, IF_NONE_MATCH};

    #[test]
    fn base_url_loses_trailing_slash() {
        let request = ResourceRequest::new(Method::GET, "http://h/books", "http://h/");
        assert_eq!(request.base_url(), "http://h");
        assert_eq!(request.absolute_url("/authors/1"), "http://h/authors/1");
    }

    #[test]
    fn preconditions_follow_the_method() {
        let read = ResourceRequest::new(Method::GET, "http://h/b/1", "http://h")
            .with_header(IF_NONE_MATCH, HeaderValue::from_static("\"t\""));
        assert!(read.evaluate_preconditions(None, Some("\"t\"")));

        let write = ResourceRequest::new(Method::DELETE, "http://h/b/1", "http://h")
            .with_header(IF_NONE_MATCH, HeaderValue::from_static("\"t\""));
        assert!(!write.evaluate_preconditions(None, Some("\"t\"")));

        let post = ResourceRequest::new(Method::POST, "http://h/b", "http://h")
            .with_header(IF_MATCH, HeaderValue::from_static("\"t\""));
        assert!(!post.evaluate_preconditions(None, Some("\"t\"")));
    }
}
