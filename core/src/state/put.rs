use crate::model::Model;
use crate::preconditions::PreconditionPair;
use crate::state::hooks::ModelHook;
use crate::state::lifecycle::{Lifecycle, StateContext};
use crate::state::post::{ModelFactory, model_from_body};
use crate::state::{LoadModel, ResourceError, ResourceRequest, UpdateModel};
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Builds the replacement from the request and the stored model.
pub type ReplacementFactory<M> = Arc<dyn Fn(&ResourceRequest, &M) -> Result<M, ResourceError> + Send + Sync>;

/// Replace a model unconditionally.
///
/// Stamps `modifiedAt` and updates the addressed model. The response has no
/// default properties.
pub struct PutState<'s, St: UpdateModel> {
    store: &'s St,
    factory: Option<ModelFactory<St::Model>>,
}

impl<'s, St: UpdateModel> PutState<'s, St> {
    /// Update `store`, building the model from the request body.
    #[must_use]
    pub const fn new(store: &'s St) -> Self {
        Self {
            store,
            factory: None,
        }
    }

    /// Build the model with `factory` instead of the request body.
    #[must_use]
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ResourceRequest) -> Result<St::Model, ResourceError> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }
}

impl<St: UpdateModel> fmt::Debug for PutState<'_, St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutState")
            .field("factory", &self.factory.is_some())
            .finish_non_exhaustive()
    }
}

impl<St: UpdateModel> Lifecycle for PutState<'_, St> {
    type Subject = St::Model;

    fn name(&self) -> &'static str {
        "PutState"
    }

    async fn execute(&self, cx: &StateContext<'_>) -> Result<St::Model, ResourceError> {
        let mut model = match &self.factory {
            Some(factory) => factory(cx.request())?,
            None => model_from_body(cx.request())?,
        };
        model.set_modified_at(cx.now());

        self.store
            .update(cx.request(), &model)
            .await
            .map_err(cx.store_failure("update"))?;
        Ok(model)
    }
}

/// Replace a model only if the client holds its current version.
///
/// Loads by key (404 if absent), runs the `before_update` hook, then
/// evaluates `If-Match`/`If-Unmodified-Since` against the stored copy. A
/// stale copy answers 412 without touching storage again. Otherwise the
/// replacement is stamped with `modifiedAt` and updated.
pub struct ConditionalPutState<'s, St: LoadModel + UpdateModel> {
    store: &'s St,
    factory: Option<ReplacementFactory<St::Model>>,
    before_update: Option<ModelHook<St::Model>>,
}

impl<'s, St: LoadModel + UpdateModel> ConditionalPutState<'s, St> {
    /// Load from and update `store`, building the replacement from the request body.
    #[must_use]
    pub const fn new(store: &'s St) -> Self {
        Self {
            store,
            factory: None,
            before_update: None,
        }
    }

    /// Build the replacement with `factory`, which also sees the stored model.
    #[must_use]
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ResourceRequest, &St::Model) -> Result<St::Model, ResourceError> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Run `hook` with the stored model before the precondition check.
    #[must_use]
    pub fn before_update<F>(mut self, hook: F) -> Self
    where
        F: for<'r> Fn(&'r ResourceRequest, &'r St::Model) -> BoxFuture<'r, Result<(), ResourceError>>
            + Send
            + Sync
            + 'static,
    {
        self.before_update = Some(Arc::new(hook));
        self
    }
}

impl<St: LoadModel + UpdateModel> fmt::Debug for ConditionalPutState<'_, St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalPutState")
            .field("factory", &self.factory.is_some())
            .field("before_update", &self.before_update.is_some())
            .finish_non_exhaustive()
    }
}

impl<St: LoadModel + UpdateModel> Lifecycle for ConditionalPutState<'_, St> {
    type Subject = St::Model;

    fn name(&self) -> &'static str {
        "ConditionalPutState"
    }

    async fn execute(&self, cx: &StateContext<'_>) -> Result<Self::Subject, ResourceError> {
        let request = cx.request();
        let current = self
            .store
            .load(request)
            .await
            .map_err(cx.store_failure("load"))?
            .ok_or_else(|| cx.not_found())?;

        if let Some(hook) = &self.before_update {
            hook(request, &current).await?;
        }

        let tag = cx.entity_tag(&current)?;
        if !PreconditionPair::Write.evaluate(request.headers(), Some(tag.as_str()), Some(current.modified_at())) {
            return Err(cx.precondition_failed());
        }

        let mut model = match &self.factory {
            Some(factory) => factory(request, &current)?,
            None => model_from_body(request)?,
        };
        model.set_modified_at(cx.now());

        self.store
            .update(request, &model)
            .await
            .map_err(cx.store_failure("update"))?;
        Ok(model)
    }
}
