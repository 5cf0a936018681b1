use crate::model::Model;
use crate::preconditions::PreconditionPair;
use crate::state::hooks::ModelHook;
use crate::state::lifecycle::{Lifecycle, StateContext};
use crate::state::{DeleteModel, LoadModel, ResourceError, ResourceRequest};
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Delete a model unconditionally.
#[derive(Debug)]
pub struct DeleteState<'s, St> {
    store: &'s St,
}

impl<'s, St: DeleteModel> DeleteState<'s, St> {
    /// Delete from `store`.
    #[must_use]
    pub const fn new(store: &'s St) -> Self {
        Self { store }
    }
}

impl<St: DeleteModel> Lifecycle for DeleteState<'_, St> {
    type Subject = ();

    fn name(&self) -> &'static str {
        "DeleteState"
    }

    async fn execute(&self, cx: &StateContext<'_>) -> Result<(), ResourceError> {
        self.store
            .delete(cx.request())
            .await
            .map_err(cx.store_failure("delete"))
    }
}

/// Delete a model only if the client holds its current version.
///
/// Loads by key (404 if absent), runs the `before_delete` hook, evaluates
/// `If-Match`/`If-Unmodified-Since` (412 when stale) and deletes. The
/// deleted model is the subject of the response hooks.
pub struct ConditionalDeleteState<'s, St: LoadModel + DeleteModel> {
    store: &'s St,
    before_delete: Option<ModelHook<St::Model>>,
}

impl<'s, St: LoadModel + DeleteModel> ConditionalDeleteState<'s, St> {
    /// Load from and delete in `store`.
    #[must_use]
    pub const fn new(store: &'s St) -> Self {
        Self {
            store,
            before_delete: None,
        }
    }

    /// Run `hook` with the stored model before the precondition check.
    #[must_use]
    pub fn before_delete<F>(mut self, hook: F) -> Self
    where
        F: for<'r> Fn(&'r ResourceRequest, &'r St::Model) -> BoxFuture<'r, Result<(), ResourceError>>
            + Send
            + Sync
            + 'static,
    {
        self.before_delete = Some(Arc::new(hook));
        self
    }
}

impl<St: LoadModel + DeleteModel> fmt::Debug for ConditionalDeleteState<'_, St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalDeleteState")
            .field("before_delete", &self.before_delete.is_some())
            .finish_non_exhaustive()
    }
}

impl<St: LoadModel + DeleteModel> Lifecycle for ConditionalDeleteState<'_, St> {
    type Subject = St::Model;

    fn name(&self) -> &'static str {
        "ConditionalDeleteState"
    }

    async fn execute(&self, cx: &StateContext<'_>) -> Result<St::Model, ResourceError> {
        let request = cx.request();
        let current = self
            .store
            .load(request)
            .await
            .map_err(cx.store_failure("load"))?
            .ok_or_else(|| cx.not_found())?;

        if let Some(hook) = &self.before_delete {
            hook(request, &current).await?;
        }

        let tag = cx.entity_tag(&current)?;
        if !PreconditionPair::Write.evaluate(request.headers(), Some(tag.as_str()), Some(current.modified_at())) {
            return Err(cx.precondition_failed());
        }

        self.store
            .delete(request)
            .await
            .map_err(cx.store_failure("delete"))?;
        Ok(current)
    }
}
