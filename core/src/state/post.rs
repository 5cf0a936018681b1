use crate::builder::ObjectBuilder;
use crate::model::Model;
use crate::state::lifecycle::{Lifecycle, StateContext};
use crate::state::{ResourceError, ResourceRequest, ResponseDraft, SaveModel};
use http::header::LOCATION;
use http::{HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Builds the model to persist from the request.
pub type ModelFactory<M> = Arc<dyn Fn(&ResourceRequest) -> Result<M, ResourceError> + Send + Sync>;

/// Deserialize the request body into a model.
///
/// # Errors
///
/// Returns [`ResourceError::Validation`] if the body does not describe a `M`.
pub fn model_from_body<M: DeserializeOwned>(request: &ResourceRequest) -> Result<M, ResourceError> {
    M::deserialize(request.body()).map_err(|error| ResourceError::Validation(format!("body {error}")))
}

/// Create a model.
///
/// Stamps `createdAt` and `modifiedAt` with the current time, saves the
/// model, and answers 201 with the created model's properties and a
/// `Location` of `<request url>/<id>`.
pub struct PostState<'s, St: SaveModel> {
    store: &'s St,
    factory: Option<ModelFactory<St::Model>>,
}

impl<'s, St: SaveModel> PostState<'s, St> {
    /// Save into `store`, building the model from the request body.
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

impl<St: SaveModel> fmt::Debug for PostState<'_, St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostState")
            .field("factory", &self.factory.is_some())
            .finish_non_exhaustive()
    }
}

impl<St: SaveModel> Lifecycle for PostState<'_, St> {
    type Subject = St::Model;

    fn name(&self) -> &'static str {
        "PostState"
    }

    async fn execute(&self, cx: &StateContext<'_>) -> Result<St::Model, ResourceError> {
        let mut model = match &self.factory {
            Some(factory) => factory(cx.request())?,
            None => model_from_body(cx.request())?,
        };

        let now = cx.now();
        model.set_created_at(now);
        model.set_modified_at(now);

        self.store.save(model).await.map_err(cx.store_failure("save"))
    }

    fn default_properties<'a>(&self, builder: ObjectBuilder<'a, St::Model>) -> ObjectBuilder<'a, St::Model> {
        builder.with_properties()
    }

    fn finalize(
        &self,
        cx: &StateContext<'_>,
        draft: ResponseDraft,
        created: &St::Model,
    ) -> Result<ResponseDraft, ResourceError> {
        let location = format!("{}/{}", cx.request().full_url(), created.id());
        let location = HeaderValue::from_str(&location).map_err(|error| cx.internal("location", &error))?;
        Ok(draft.with_header(LOCATION, location))
    }

    fn success_status(&self) -> StatusCode {
        StatusCode::CREATED
    }
}
