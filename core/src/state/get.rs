use crate::builder::ObjectBuilder;
use crate::etag::http_date;
use crate::model::Model;
use crate::preconditions::PreconditionPair;
use crate::state::lifecycle::{Lifecycle, StateContext};
use crate::state::{LoadModel, ResourceError, ResourceResponse, ResponseDraft};
use http::header::{CACHE_CONTROL, ETAG, LAST_MODIFIED};
use http::{HeaderMap, HeaderValue};

/// `Cache-Control` value for responses that must always be revalidated.
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Read a single model.
///
/// Loads by key (404 if absent), answers 304 when the client's
/// `If-None-Match`/`If-Modified-Since` matches the current version, and
/// otherwise returns the model's primitive properties with `ETag`,
/// `Last-Modified` and `Cache-Control` headers.
#[derive(Debug)]
pub struct GetState<'s, St> {
    store: &'s St,
}

impl<'s, St: LoadModel> GetState<'s, St> {
    /// Read from `store`.
    #[must_use]
    pub const fn new(store: &'s St) -> Self {
        Self { store }
    }
}

impl<St: LoadModel> Lifecycle for GetState<'_, St> {
    type Subject = St::Model;

    fn name(&self) -> &'static str {
        "GetState"
    }

    async fn execute(&self, cx: &StateContext<'_>) -> Result<St::Model, ResourceError> {
        self.store
            .load(cx.request())
            .await
            .map_err(cx.store_failure("load"))?
            .ok_or_else(|| cx.not_found())
    }

    fn short_circuit(
        &self,
        cx: &StateContext<'_>,
        model: &St::Model,
    ) -> Result<Option<ResourceResponse>, ResourceError> {
        let tag = cx.entity_tag(model)?;
        let current = PreconditionPair::Read.evaluate(
            cx.request().headers(),
            Some(tag.as_str()),
            Some(model.modified_at()),
        );
        if !current {
            return Ok(None);
        }

        tracing::debug!(state = cx.state(), "Client has the current version");
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&tag) {
            headers.insert(ETAG, value);
        }
        Ok(Some(ResourceResponse::not_modified(headers)))
    }

    fn default_properties<'a>(&self, builder: ObjectBuilder<'a, St::Model>) -> ObjectBuilder<'a, St::Model> {
        builder.with_properties()
    }

    fn finalize(
        &self,
        cx: &StateContext<'_>,
        mut draft: ResponseDraft,
        model: &St::Model,
    ) -> Result<ResponseDraft, ResourceError> {
        let tag = cx.entity_tag(model)?;
        let tag = HeaderValue::from_str(&tag).map_err(|error| cx.internal("entity_tag", &error))?;
        draft = draft.with_header(ETAG, tag);

        if let Some(date) = http_date(model.modified_at()).and_then(|date| HeaderValue::from_str(&date).ok()) {
            draft = draft.with_header(LAST_MODIFIED, date);
        }

        Ok(draft.with_header(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE)))
    }
}
