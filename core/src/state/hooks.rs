//! Extension points of the pipeline.
//!
//! Every hook is optional. An unset hook is a no-op, except
//! `define_properties`, which replaces the state's default projection when
//! set.
//!
//! ```
//! use resourceful_core::state::Hooks;
//! use serde_json::Value;
//!
//! let hooks: Hooks<Value> = Hooks::new()
//!     .before(|_request| Box::pin(async { Ok(()) }))
//!     .define_links(|builder| builder.with_absolute_link("collection", "/books"));
//! assert!(hooks.has_before());
//! ```

use crate::builder::ObjectBuilder;
use crate::state::{ResourceError, ResourceRequest};
use futures::future::BoxFuture;
use http::HeaderMap;
use std::fmt;
use std::sync::Arc;

/// Async hook receiving the request.
pub type RequestHook =
    Arc<dyn for<'r> Fn(&'r ResourceRequest) -> BoxFuture<'r, Result<(), ResourceError>> + Send + Sync>;

/// Async hook receiving the request and a model.
pub type ModelHook<S> = Arc<
    dyn for<'r> Fn(&'r ResourceRequest, &'r S) -> BoxFuture<'r, Result<(), ResourceError>>
        + Send
        + Sync,
>;

/// Hook shaping the response document.
pub type ShapeHook<S> = Arc<dyn for<'a> Fn(ObjectBuilder<'a, S>) -> ObjectBuilder<'a, S> + Send + Sync>;

/// Final header hook.
pub type ResponseHook<S> = Arc<dyn Fn(&S, HeaderMap) -> HeaderMap + Send + Sync>;

/// Optional callbacks run at fixed points of [`ResourceStateMachine::build`](crate::state::ResourceStateMachine::build).
///
/// `S` is the state's subject: the loaded or persisted model, the collection
/// result, or `()` for unconditional deletes.
pub struct Hooks<S> {
    pub(crate) before: Option<RequestHook>,
    pub(crate) after: Option<ModelHook<S>>,
    pub(crate) define_properties: Option<ShapeHook<S>>,
    pub(crate) define_links: Option<ShapeHook<S>>,
    pub(crate) define_embedded: Option<ShapeHook<S>>,
    pub(crate) define_http_response: Option<ResponseHook<S>>,
}

impl<S> Hooks<S> {
    /// No hooks.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            before: None,
            after: None,
            define_properties: None,
            define_links: None,
            define_embedded: None,
            define_http_response: None,
        }
    }

    /// Run before the state loads or mutates anything.
    #[must_use]
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: for<'r> Fn(&'r ResourceRequest) -> BoxFuture<'r, Result<(), ResourceError>>
            + Send
            + Sync
            + 'static,
    {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Run after the load or mutation succeeded.
    #[must_use]
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: for<'r> Fn(&'r ResourceRequest, &'r S) -> BoxFuture<'r, Result<(), ResourceError>>
            + Send
            + Sync
            + 'static,
    {
        self.after = Some(Arc::new(hook));
        self
    }

    /// Replace the default property projection.
    #[must_use]
    pub fn define_properties<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(ObjectBuilder<'a, S>) -> ObjectBuilder<'a, S> + Send + Sync + 'static,
    {
        self.define_properties = Some(Arc::new(hook));
        self
    }

    /// Add links to the document.
    #[must_use]
    pub fn define_links<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(ObjectBuilder<'a, S>) -> ObjectBuilder<'a, S> + Send + Sync + 'static,
    {
        self.define_links = Some(Arc::new(hook));
        self
    }

    /// Add embedded resources to the document.
    #[must_use]
    pub fn define_embedded<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(ObjectBuilder<'a, S>) -> ObjectBuilder<'a, S> + Send + Sync + 'static,
    {
        self.define_embedded = Some(Arc::new(hook));
        self
    }

    /// Adjust the headers right before the response is returned.
    #[must_use]
    pub fn define_http_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&S, HeaderMap) -> HeaderMap + Send + Sync + 'static,
    {
        self.define_http_response = Some(Arc::new(hook));
        self
    }

    /// Whether a `before` hook is set.
    #[must_use]
    pub const fn has_before(&self) -> bool {
        self.before.is_some()
    }
}

impl<S> Default for Hooks<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for Hooks<S> {
    fn clone(&self) -> Self {
        Self {
            before: self.before.clone(),
            after: self.after.clone(),
            define_properties: self.define_properties.clone(),
            define_links: self.define_links.clone(),
            define_embedded: self.define_embedded.clone(),
            define_http_response: self.define_http_response.clone(),
        }
    }
}

impl<S> fmt::Debug for Hooks<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("define_properties", &self.define_properties.is_some())
            .field("define_links", &self.define_links.is_some())
            .field("define_embedded", &self.define_embedded.is_some())
            .field("define_http_response", &self.define_http_response.is_some())
            .finish()
    }
}
