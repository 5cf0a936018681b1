//! The shared lifecycle pipeline.
//!
//! [`ResourceStateMachine::build`] runs, strictly in sequence:
//!
//! 1. `before` hook
//! 2. [`Lifecycle::execute`]: the verb's load, precondition and mutation
//! 3. `after` hook
//! 4. [`Lifecycle::short_circuit`] (Get answers 304 here)
//! 5. [`Lifecycle::prepare`] (collections add pagination here)
//! 6. properties, links and embedded resources
//! 7. [`Lifecycle::finalize`] for verb headers, then the success status
//! 8. `define_http_response` hook
//!
//! Any error stops the pipeline; partial documents are never returned.

use crate::builder::{HalContext, ObjectBuilder};
use crate::config::HalConfig;
use crate::environment::{Clock, SystemClock};
use crate::etag::entity_tag;
use crate::hal::ResourceObject;
use crate::state::{Hooks, ResourceError, ResourceRequest, ResourceResponse, ResponseDraft, StoreError};
use http::StatusCode;
use serde::Serialize;
use std::future::Future;
use std::time::Instant;
use tracing::Instrument;

static SYSTEM_CLOCK: SystemClock = SystemClock;

/// Per-verb strategy plugged into the pipeline.
pub trait Lifecycle: Send + Sync {
    /// What the verb produces for the response steps.
    type Subject: Send + Sync;

    /// State name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Load, check and mutate.
    ///
    /// # Errors
    ///
    /// Returns the outcome that ends the pipeline.
    fn execute(
        &self,
        cx: &StateContext<'_>,
    ) -> impl Future<Output = Result<Self::Subject, ResourceError>> + Send;

    /// Answer early after the `after` hook. The default continues.
    ///
    /// # Errors
    ///
    /// Returns error if the check itself fails.
    fn short_circuit(
        &self,
        _cx: &StateContext<'_>,
        _subject: &Self::Subject,
    ) -> Result<Option<ResourceResponse>, ResourceError> {
        Ok(None)
    }

    /// Shape the draft before the document hooks run.
    ///
    /// # Errors
    ///
    /// Returns error if the draft cannot be prepared.
    fn prepare(
        &self,
        _cx: &StateContext<'_>,
        draft: ResponseDraft,
        _subject: &Self::Subject,
    ) -> Result<ResponseDraft, ResourceError> {
        Ok(draft)
    }

    /// Properties used when no `define_properties` hook is set.
    fn default_properties<'a>(&self, builder: ObjectBuilder<'a, Self::Subject>) -> ObjectBuilder<'a, Self::Subject> {
        builder
    }

    /// Add verb headers after the document is complete.
    ///
    /// # Errors
    ///
    /// Returns error if a header cannot be produced.
    fn finalize(
        &self,
        _cx: &StateContext<'_>,
        draft: ResponseDraft,
        _subject: &Self::Subject,
    ) -> Result<ResponseDraft, ResourceError> {
        Ok(draft)
    }

    /// Status of a successful response.
    fn success_status(&self) -> StatusCode {
        StatusCode::OK
    }
}

/// Read-only context handed to every pipeline step.
pub struct StateContext<'r> {
    request: &'r ResourceRequest,
    config: &'r HalConfig,
    clock: &'r dyn Clock,
    state: &'static str,
}

impl<'r> StateContext<'r> {
    /// The current request.
    #[must_use]
    pub const fn request(&self) -> &'r ResourceRequest {
        self.request
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &'r HalConfig {
        self.config
    }

    /// Name of the running state.
    #[must_use]
    pub const fn state(&self) -> &'static str {
        self.state
    }

    /// Current time in epoch milliseconds.
    #[must_use]
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Builder context for the request.
    #[must_use]
    pub fn hal(&self) -> HalContext<'r> {
        self.request.hal(self.config)
    }

    /// Map a storage failure of `operation` to [`ResourceError::Internal`], logging it.
    pub fn store_failure(&self, operation: &'static str) -> impl FnOnce(StoreError) -> ResourceError + use<> {
        let state = self.state;
        move |error| {
            tracing::error!(state, operation, error = %error, "Persistence operation failed");
            crate::metrics::record_store_error(state, operation);
            ResourceError::Internal { state, operation }
        }
    }

    /// An internal failure of a non-storage step, logged.
    #[must_use]
    pub fn internal(&self, operation: &'static str, error: &dyn std::fmt::Display) -> ResourceError {
        tracing::error!(state = self.state, operation, error = %error, "Internal step failed");
        ResourceError::Internal {
            state: self.state,
            operation,
        }
    }

    /// The load step produced no model.
    #[must_use]
    pub fn not_found(&self) -> ResourceError {
        tracing::debug!(state = self.state, url = self.request.full_url(), "Resource not found");
        ResourceError::NotFound
    }

    /// The client's copy is stale.
    #[must_use]
    pub fn precondition_failed(&self) -> ResourceError {
        tracing::debug!(state = self.state, url = self.request.full_url(), "Precondition failed");
        ResourceError::PreconditionFailed
    }

    /// Entity tag of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Internal`] if `value` cannot be serialized.
    pub fn entity_tag<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, ResourceError> {
        entity_tag(value).map_err(|error| self.internal("entity_tag", &error))
    }
}

/// One request's run through a [`Lifecycle`].
///
/// ```no_run
/// use resourceful_core::config::HalConfig;
/// use resourceful_core::state::{GetState, LoadModel, ResourceRequest, ResourceStateMachine};
///
/// # async fn example<S: LoadModel>(store: &S, request: &ResourceRequest) {
/// let config = HalConfig::default();
/// let response = ResourceStateMachine::new(GetState::new(store), request, &config)
///     .build()
///     .await;
/// # }
/// ```
pub struct ResourceStateMachine<'r, L: Lifecycle> {
    lifecycle: L,
    request: &'r ResourceRequest,
    config: &'r HalConfig,
    clock: &'r dyn Clock,
    hooks: Hooks<L::Subject>,
}

impl<'r, L: Lifecycle> ResourceStateMachine<'r, L> {
    /// Prepare a run of `lifecycle` for `request`.
    #[must_use]
    pub fn new(lifecycle: L, request: &'r ResourceRequest, config: &'r HalConfig) -> Self {
        Self {
            lifecycle,
            request,
            config,
            clock: &SYSTEM_CLOCK,
            hooks: Hooks::new(),
        }
    }

    /// Use `clock` for `createdAt`/`modifiedAt`.
    #[must_use]
    pub fn with_clock(mut self, clock: &'r dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Install hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks<L::Subject>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Run the pipeline to a response.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for not found, stale preconditions, invalid
    /// input and internal failures.
    pub async fn build(self) -> Result<ResourceResponse, ResourceError> {
        let state = self.lifecycle.name();
        let span = tracing::debug_span!("resource_state", state, method = %self.request.method());
        let started = Instant::now();

        let result = self.run().instrument(span).await;

        let status = match &result {
            Ok(response) => response.status(),
            Err(error) => error.status(),
        };
        crate::metrics::record_response(state, status, started.elapsed().as_secs_f64());
        result
    }

    async fn run(self) -> Result<ResourceResponse, ResourceError> {
        let Self {
            lifecycle,
            request,
            config,
            clock,
            hooks,
        } = self;
        let cx = StateContext {
            request,
            config,
            clock,
            state: lifecycle.name(),
        };

        if let Some(before) = &hooks.before {
            before(request).await?;
        }

        let subject = lifecycle.execute(&cx).await?;

        if let Some(after) = &hooks.after {
            after(request, &subject).await?;
        }

        if let Some(response) = lifecycle.short_circuit(&cx, &subject)? {
            return Ok(response);
        }

        let draft = ResponseDraft::new(ResourceObject::new(request.full_url()));
        let (document, headers) = lifecycle.prepare(&cx, draft, &subject)?.into_parts();

        let mut builder = ObjectBuilder::new(&subject, document, cx.hal());
        builder = match &hooks.define_properties {
            Some(define) => define(builder),
            None => lifecycle.default_properties(builder),
        };
        if let Some(define) = &hooks.define_links {
            builder = define(builder);
        }
        if let Some(define) = &hooks.define_embedded {
            builder = define(builder);
        }

        let draft = ResponseDraft::from_parts(builder.into_document(), headers);
        let (document, mut headers) = lifecycle.finalize(&cx, draft, &subject)?.into_parts();

        if let Some(define) = &hooks.define_http_response {
            headers = define(&subject, headers);
        }

        tracing::debug!(state = cx.state, "Response built");
        Ok(ResourceResponse::new(lifecycle.success_status(), headers, Some(document)))
    }
}
