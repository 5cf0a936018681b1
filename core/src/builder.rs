//! HAL document builders.
//!
//! Two builder shapes assemble resource objects:
//!
//! - [`ObjectBuilder`] works on a single document and the model it describes.
//! - [`ArrayBuilder`] applies the same primitives element-wise over a slice of
//!   models and the parallel list of documents.
//!
//! Builders are consumed and returned by every call so they chain, and a
//! nested builder is handed to a closure when embedding:
//!
//! ```
//! use resourceful_core::builder::{HalContext, ObjectBuilder};
//! use resourceful_core::hal::ResourceObject;
//! use serde_json::json;
//!
//! let book = json!({ "id": "1", "title": "Dune", "author": { "id": "7", "name": "Frank" } });
//! let author = &book["author"];
//!
//! let hal = HalContext::new("https://api.example.com", true);
//! let document = ObjectBuilder::new(&book, ResourceObject::new("/books/1"), hal)
//!     .with_properties()
//!     .with_embedded_object("author", "/authors/7", author, |b| b.with_properties())
//!     .into_document();
//!
//! assert_eq!(document.property("title"), Some(&json!("Dune")));
//! // hypertext cache pattern: the embedded self link is mirrored
//! assert!(document.link("author").is_some());
//! ```

use crate::hal::{Embedded, Link, LinkOptions, Links, ResourceObject, SELF_RELATION};
use crate::properties::{PrimitiveProjector, PropertyProjector, is_primitive_value, to_property_map};
use serde::Serialize;
use serde_json::{Map, Value};

/// Request-scoped settings the builders need: where relative hrefs resolve
/// and whether the hypertext cache pattern is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalContext<'a> {
    base_url: &'a str,
    hypertext_cache_pattern: bool,
}

impl<'a> HalContext<'a> {
    /// Create a context. `base_url` must not end with `/`.
    #[must_use]
    pub const fn new(base_url: &'a str, hypertext_cache_pattern: bool) -> Self {
        Self {
            base_url,
            hypertext_cache_pattern,
        }
    }

    /// Base URL relative hrefs resolve against.
    #[must_use]
    pub const fn base_url(&self) -> &'a str {
        self.base_url
    }

    /// Whether embedded self links are mirrored into the parent's links.
    #[must_use]
    pub const fn hypertext_cache_pattern(&self) -> bool {
        self.hypertext_cache_pattern
    }

    /// Resolve `href` against the base URL. Absolute URLs are returned as is.
    #[must_use]
    pub fn absolute_url(&self, href: &str) -> String {
        absolute_url(self.base_url, href)
    }
}

/// Join `href` to `base_url` with exactly one `/`, unless `href` is already absolute.
#[must_use]
pub fn absolute_url(base_url: &str, href: &str) -> String {
    if href.contains("://") {
        return href.to_string();
    }
    let base = base_url.trim_end_matches('/');
    match href.strip_prefix('/') {
        Some(path) => format!("{base}/{path}"),
        None if href.is_empty() => base.to_string(),
        None => format!("{base}/{href}"),
    }
}

/// Substitute `{field}` tokens in `pattern` with fields of `model`.
///
/// Strings are inserted verbatim, other values by their JSON text, missing
/// fields by nothing. An unterminated `{` is kept literally.
///
/// ```
/// use resourceful_core::builder::fill_in_placeholder;
/// use serde_json::json;
///
/// let href = fill_in_placeholder("/shelves/{shelf}/books/{id}", &json!({ "shelf": "a", "id": 3 }));
/// assert_eq!(href, "/shelves/a/books/3");
/// ```
#[must_use]
pub fn fill_in_placeholder<T: Serialize + ?Sized>(pattern: &str, model: &T) -> String {
    fill_in_placeholder_map(pattern, &to_property_map(model))
}

/// [`fill_in_placeholder`] over an already serialized model.
#[must_use]
pub fn fill_in_placeholder_map(pattern: &str, fields: &Map<String, Value>) -> String {
    let mut filled = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find('{') {
        let Some(length) = rest[start..].find('}') else {
            break;
        };
        filled.push_str(&rest[..start]);
        let key = &rest[start + 1..start + length];
        match fields.get(key) {
            Some(Value::String(value)) => filled.push_str(value),
            Some(Value::Null) | None => {}
            Some(value) => filled.push_str(&value.to_string()),
        }
        rest = &rest[start + length + 1..];
    }

    filled.push_str(rest);
    filled
}

/// Builder over a single resource object and the model it represents.
pub struct ObjectBuilder<'a, T: ?Sized> {
    model: &'a T,
    document: ResourceObject,
    hal: HalContext<'a>,
}

impl<'a, T: ?Sized> ObjectBuilder<'a, T> {
    /// Start building `document` for `model`.
    #[must_use]
    pub const fn new(model: &'a T, document: ResourceObject, hal: HalContext<'a>) -> Self {
        Self {
            model,
            document,
            hal,
        }
    }

    /// The model this document describes.
    #[must_use]
    pub const fn model(&self) -> &'a T {
        self.model
    }

    /// The builder's context.
    #[must_use]
    pub const fn hal(&self) -> HalContext<'a> {
        self.hal
    }

    /// The document assembled so far.
    #[must_use]
    pub const fn document(&self) -> &ResourceObject {
        &self.document
    }

    /// Finish and return the document.
    #[must_use]
    pub fn into_document(self) -> ResourceObject {
        self.document
    }

    /// Copy the primitive fields of the model.
    #[must_use]
    pub fn with_properties(self) -> Self
    where
        T: Serialize,
    {
        self.with_projected_properties(&PrimitiveProjector)
    }

    /// Copy the fields `projector` selects for the model.
    #[must_use]
    pub fn with_projected_properties<P>(mut self, projector: &P) -> Self
    where
        P: PropertyProjector<T> + ?Sized,
    {
        let properties = projector.project(self.model);
        crate::properties::copy_primitive_properties(&properties, &mut self.document);
        self
    }

    /// Copy the primitive fields of a map derived from the model.
    #[must_use]
    pub fn with_properties_from<F>(mut self, define: F) -> Self
    where
        F: FnOnce(&T) -> Map<String, Value>,
    {
        let properties = define(self.model);
        crate::properties::copy_primitive_properties(&properties, &mut self.document);
        self
    }

    /// Set a single property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.document.set_property(key, value);
        self
    }

    /// Set the link for `relation` to `href`, unchanged.
    #[must_use]
    pub fn with_link(self, relation: impl Into<String>, href: impl Into<String>) -> Self {
        self.with_link_options(relation, href, LinkOptions::default())
    }

    /// Set the link for `relation` with optional attributes.
    #[must_use]
    pub fn with_link_options(
        mut self,
        relation: impl Into<String>,
        href: impl Into<String>,
        options: LinkOptions,
    ) -> Self {
        self.document
            .set_link(relation, Link::with_options(href, options));
        self
    }

    /// Set the link for `relation` to `href` resolved against the base URL.
    #[must_use]
    pub fn with_absolute_link(self, relation: impl Into<String>, href: &str) -> Self {
        self.with_absolute_link_options(relation, href, LinkOptions::default())
    }

    /// [`with_absolute_link`](Self::with_absolute_link) with optional attributes.
    #[must_use]
    pub fn with_absolute_link_options(
        self,
        relation: impl Into<String>,
        href: &str,
        options: LinkOptions,
    ) -> Self {
        let href = self.hal.absolute_url(href);
        self.with_link_options(relation, href, options)
    }

    /// Set several links under one relation.
    #[must_use]
    pub fn with_links(mut self, relation: impl Into<String>, links: Vec<Link>) -> Self {
        self.document.set_link(relation, Links::Many(links));
        self
    }

    /// Embed `model` under `relation` with its self link set to `href`.
    ///
    /// `build` shapes the embedded document. With the hypertext cache pattern
    /// enabled the embedded self link is also set as the parent's
    /// `_links[relation]`.
    #[must_use]
    pub fn with_embedded_object<'m, U, F>(
        mut self,
        relation: &str,
        href: impl Into<String>,
        model: &'m U,
        build: F,
    ) -> Self
    where
        'a: 'm,
        U: ?Sized,
        F: FnOnce(ObjectBuilder<'m, U>) -> ObjectBuilder<'m, U>,
    {
        embed_object(&mut self.document, self.hal, relation, href.into(), model, build);
        self
    }

    /// [`with_embedded_object`](Self::with_embedded_object) with `href`
    /// resolved against the base URL.
    #[must_use]
    pub fn with_absolute_embedded_object<'m, U, F>(
        self,
        relation: &str,
        href: &str,
        model: &'m U,
        build: F,
    ) -> Self
    where
        'a: 'm,
        U: ?Sized,
        F: FnOnce(ObjectBuilder<'m, U>) -> ObjectBuilder<'m, U>,
    {
        let href = self.hal.absolute_url(href);
        self.with_embedded_object(relation, href, model, build)
    }

    /// Embed `models` under `relation` as an ordered list.
    ///
    /// Each element starts with a self link filled in from
    /// `self_href_pattern` and resolved against the base URL.
    #[must_use]
    pub fn with_embedded_array<'m, U, F>(
        mut self,
        relation: &str,
        models: &'m [U],
        self_href_pattern: &str,
        build: F,
    ) -> Self
    where
        'a: 'm,
        U: Serialize,
        F: FnOnce(ArrayBuilder<'m, U>) -> ArrayBuilder<'m, U>,
    {
        let documents = build(ArrayBuilder::new(models, self_href_pattern, self.hal)).into_documents();
        self.document
            .set_embedded(relation, Embedded::Many(documents));
        self
    }
}

fn embed_object<'m, U, F>(
    parent: &mut ResourceObject,
    hal: HalContext<'m>,
    relation: &str,
    href: String,
    model: &'m U,
    build: F,
) where
    U: ?Sized,
    F: FnOnce(ObjectBuilder<'m, U>) -> ObjectBuilder<'m, U>,
{
    let embedded = build(ObjectBuilder::new(model, ResourceObject::new(href), hal)).into_document();

    if hal.hypertext_cache_pattern() {
        if let Some(self_link) = embedded.self_link() {
            parent.set_link(relation, self_link.clone());
        }
    }

    parent.set_embedded(relation, Embedded::One(Box::new(embedded)));
}

/// Builder over a list of resource objects, one per model.
pub struct ArrayBuilder<'a, T> {
    models: &'a [T],
    documents: Vec<ResourceObject>,
    hal: HalContext<'a>,
}

impl<'a, T: Serialize> ArrayBuilder<'a, T> {
    /// Start building one document per model, each with a self link filled in
    /// from `self_href_pattern`.
    #[must_use]
    pub fn new(models: &'a [T], self_href_pattern: &str, hal: HalContext<'a>) -> Self {
        let documents = models
            .iter()
            .map(|model| {
                ResourceObject::new(hal.absolute_url(&fill_in_placeholder(self_href_pattern, model)))
            })
            .collect();
        Self {
            models,
            documents,
            hal,
        }
    }

    /// The source models.
    #[must_use]
    pub const fn models(&self) -> &'a [T] {
        self.models
    }

    /// The documents assembled so far, parallel to [`models`](Self::models).
    #[must_use]
    pub fn documents(&self) -> &[ResourceObject] {
        &self.documents
    }

    /// Finish and return the documents.
    #[must_use]
    pub fn into_documents(self) -> Vec<ResourceObject> {
        self.documents
    }

    /// Replace every element's self link using `href_pattern`.
    #[must_use]
    pub fn with_self_links(self, href_pattern: &str) -> Self {
        self.with_absolute_links(SELF_RELATION, href_pattern)
    }

    /// Set `relation` on every element, `href_pattern` filled in per model
    /// and resolved against the base URL.
    #[must_use]
    pub fn with_absolute_links(self, relation: &str, href_pattern: &str) -> Self {
        self.with_absolute_links_options(relation, href_pattern, &LinkOptions::default())
    }

    /// [`with_absolute_links`](Self::with_absolute_links) with optional attributes.
    #[must_use]
    pub fn with_absolute_links_options(
        self,
        relation: &str,
        href_pattern: &str,
        options: &LinkOptions,
    ) -> Self {
        let absolute = self.hal.absolute_url(href_pattern);
        self.with_links_options(relation, &absolute, options)
    }

    /// Set `relation` on every element, `href_pattern` filled in per model.
    #[must_use]
    pub fn with_links(self, relation: &str, href_pattern: &str) -> Self {
        self.with_links_options(relation, href_pattern, &LinkOptions::default())
    }

    /// [`with_links`](Self::with_links) with optional attributes.
    #[must_use]
    pub fn with_links_options(
        mut self,
        relation: &str,
        href_pattern: &str,
        options: &LinkOptions,
    ) -> Self {
        for (model, document) in self.models.iter().zip(self.documents.iter_mut()) {
            let href = fill_in_placeholder(href_pattern, model);
            document.set_link(relation, Link::with_options(href, options.clone()));
        }
        self
    }

    /// Copy the primitive fields of each model.
    ///
    /// Keys already present on an element are kept.
    #[must_use]
    pub fn with_properties(self) -> Self {
        self.with_properties_from(|model| PrimitiveProjector.project(model))
    }

    /// Copy the primitive fields of a map derived from each model.
    ///
    /// Keys already present on an element are kept.
    #[must_use]
    pub fn with_properties_from<F>(mut self, define: F) -> Self
    where
        F: Fn(&T) -> Map<String, Value>,
    {
        for (model, document) in self.models.iter().zip(self.documents.iter_mut()) {
            for (key, value) in define(model) {
                if is_primitive_value(&value) && !document.has_property(&key) {
                    document.set_property(key, value);
                }
            }
        }
        self
    }

    /// Embed a sub-model of each element under `relation`.
    ///
    /// `select` picks the sub-model and `href_pattern` is filled in from it.
    #[must_use]
    pub fn with_embedded_objects<U, S, F>(
        mut self,
        relation: &str,
        href_pattern: &str,
        select: S,
        build: F,
    ) -> Self
    where
        U: Serialize + ?Sized + 'a,
        S: Fn(&'a T) -> &'a U,
        F: Fn(ObjectBuilder<'a, U>) -> ObjectBuilder<'a, U>,
    {
        let hal = self.hal;
        for (model, document) in self.models.iter().zip(self.documents.iter_mut()) {
            let sub_model = select(model);
            let href = fill_in_placeholder(href_pattern, sub_model);
            embed_object(document, hal, relation, href, sub_model, &build);
        }
        self
    }
}
