use crate::config::PaginationConfig;
use crate::hal::Link;
use crate::pagination::{CollectionResult, OffsetSizePage, OffsetSizePagination, Pagination};
use crate::state::get::NO_CACHE;
use crate::state::lifecycle::{Lifecycle, StateContext};
use crate::state::{LoadCollection, ResourceError, ResourceRequest, ResponseDraft};
use http::HeaderValue;
use http::header::CACHE_CONTROL;
use url::Url;

/// Query parameter holding the window offset.
pub const OFFSET_PARAM: &str = "offset";
/// Query parameter holding the window size.
pub const SIZE_PARAM: &str = "size";

/// Read a paginated collection.
///
/// The window comes from the `offset` and `size` query parameters. The
/// response carries a `totalCount` property and `self`/`first`/`prev`/`next`/`last`
/// links that rewrite those parameters on the current URL. Embedding the
/// results is left to the `define_embedded` hook.
#[derive(Debug)]
pub struct GetCollectionState<'s, St> {
    store: &'s St,
}

impl<'s, St: LoadCollection> GetCollectionState<'s, St> {
    /// Read from `store`.
    #[must_use]
    pub const fn new(store: &'s St) -> Self {
        Self { store }
    }
}

impl<St: LoadCollection> Lifecycle for GetCollectionState<'_, St> {
    type Subject = CollectionResult<St::Model>;

    fn name(&self) -> &'static str {
        "GetCollectionState"
    }

    async fn execute(&self, cx: &StateContext<'_>) -> Result<Self::Subject, ResourceError> {
        let page = requested_page(cx.request(), &cx.config().pagination)?;
        self.store
            .load_page(cx.request(), page)
            .await
            .map_err(cx.store_failure("load_collection"))
    }

    fn prepare(
        &self,
        cx: &StateContext<'_>,
        draft: ResponseDraft,
        result: &Self::Subject,
    ) -> Result<ResponseDraft, ResourceError> {
        let defaults = cx.config().pagination;
        let page = requested_page(cx.request(), &defaults)?;

        let urls = OffsetSizePagination::for_result(result, page)
            .with_defaults(defaults.default_size, defaults.default_offset)
            .build()
            .try_map(|page| page_url(cx.request().full_url(), page))
            .map_err(|error| cx.internal("pagination", &error))?;

        let total_count = result.total_count;
        Ok(draft
            .with_header(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE))
            .map_document(|mut document| {
                for (relation, href) in urls.relations() {
                    document.set_link(relation, Link::new(href.clone()));
                }
                document.set_property("totalCount", total_count);
                document
            }))
    }
}

/// The window requested by `offset`/`size`, falling back to `defaults`.
///
/// # Errors
///
/// Returns [`ResourceError::Validation`] if a parameter is not a non-negative integer.
pub fn requested_page(
    request: &ResourceRequest,
    defaults: &PaginationConfig,
) -> Result<OffsetSizePage, ResourceError> {
    let offset = query_number(request, OFFSET_PARAM)?.unwrap_or(defaults.default_offset);
    let size = query_number(request, SIZE_PARAM)?.unwrap_or(defaults.default_size);
    Ok(OffsetSizePage::new(offset, size))
}

fn query_number(request: &ResourceRequest, key: &str) -> Result<Option<u64>, ResourceError> {
    match request.query_param(key).map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            ResourceError::Validation(format!("querystring/{key} must be a non-negative integer"))
        }),
    }
}

/// `full_url` with its `size` and `offset` query parameters set to `page`.
///
/// Other parameters keep their position.
///
/// # Errors
///
/// Returns error if `full_url` is not an absolute URL.
pub fn page_url(full_url: &str, page: OffsetSizePage) -> Result<String, url::ParseError> {
    let mut url = Url::parse(full_url)?;
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    set_pair(&mut pairs, SIZE_PARAM, page.size.to_string());
    set_pair(&mut pairs, OFFSET_PARAM, page.offset.to_string());
    url.query_pairs_mut().clear().extend_pairs(&pairs);
    Ok(url.into())
}

fn set_pair(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    let mut seen = false;
    pairs.retain_mut(|(name, current)| {
        if name != key {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        current.clone_from(&value);
        true
    });
    if !seen {
        pairs.push((key.to_string(), value));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn page_urls_replace_window_parameters() {
        let url = page_url("http://h/books?q=x&offset=13&size=10", OffsetSizePage::new(23, 10)).unwrap();
        assert_eq!(url, "http://h/books?q=x&offset=23&size=10");
    }

    #[test]
    fn page_urls_append_missing_parameters() {
        let url = page_url("http://h/books", OffsetSizePage::new(0, 5)).unwrap();
        assert_eq!(url, "http://h/books?size=5&offset=0");
    }

    #[test]
    fn relative_urls_are_rejected() {
        assert!(page_url("/books", OffsetSizePage::new(0, 5)).is_err());
    }

    #[test]
    fn requested_page_uses_defaults() {
        let defaults = PaginationConfig::default();
        let request = ResourceRequest::new(Method::GET, "http://h/books", "http://h")
            .with_query("size", "25")
            .with_query("offset", "");
        assert_eq!(requested_page(&request, &defaults).unwrap(), OffsetSizePage::new(0, 25));
    }

    #[test]
    fn non_numeric_windows_are_invalid() {
        let request = ResourceRequest::new(Method::GET, "http://h/books", "http://h").with_query("offset", "-1");
        assert!(matches!(
            requested_page(&request, &PaginationConfig::default()),
            Err(ResourceError::Validation(_))
        ));
    }
}
