//! HAL document format.
//!
//! See <https://datatracker.ietf.org/doc/html/draft-kelly-json-hal-08>.
//!
//! A [`ResourceObject`] always carries a `self` link: it is required by
//! [`ResourceObject::new`] and no API removes links.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Media type of every document produced by the lifecycle engine.
pub const HAL_MEDIA_TYPE: &str = "application/hal+json";

/// Relation name of the link pointing at the resource itself.
pub const SELF_RELATION: &str = "self";

/// A HAL link object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// URI or URI template of the target.
    pub href: String,

    /// `true` when `href` is a URI template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templated: Option<bool>,

    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Language of the target resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,

    /// Media type hint for the target.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// URL describing the deprecation of this link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,

    /// Secondary key among links sharing a relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Link {
    /// Create a link with only an `href`.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    /// Create a link from an `href` and the optional attributes.
    #[must_use]
    pub fn with_options(href: impl Into<String>, options: LinkOptions) -> Self {
        Self {
            href: href.into(),
            templated: options.templated,
            title: options.title,
            hreflang: options.hreflang,
            media_type: options.media_type,
            deprecation: options.deprecation,
            name: options.name,
        }
    }
}

/// Optional attributes of a link, everything but `href`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkOptions {
    /// See [`Link::templated`].
    pub templated: Option<bool>,
    /// See [`Link::title`].
    pub title: Option<String>,
    /// See [`Link::hreflang`].
    pub hreflang: Option<String>,
    /// See [`Link::media_type`].
    pub media_type: Option<String>,
    /// See [`Link::deprecation`].
    pub deprecation: Option<String>,
    /// See [`Link::name`].
    pub name: Option<String>,
}

impl LinkOptions {
    /// No optional attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the href as a URI template.
    #[must_use]
    pub const fn templated(mut self) -> Self {
        self.templated = Some(true);
        self
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the language of the target.
    #[must_use]
    pub fn hreflang(mut self, hreflang: impl Into<String>) -> Self {
        self.hreflang = Some(hreflang.into());
        self
    }

    /// Set the media type hint.
    #[must_use]
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Mark the link as deprecated.
    #[must_use]
    pub fn deprecation(mut self, url: impl Into<String>) -> Self {
        self.deprecation = Some(url.into());
        self
    }

    /// Set the secondary key.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Value of a `_links` entry: one link or an ordered list of links.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Links {
    /// A single link object.
    One(Link),
    /// Several links sharing a relation.
    Many(Vec<Link>),
}

impl Links {
    /// The single link, if this entry is not a list.
    #[must_use]
    pub const fn as_link(&self) -> Option<&Link> {
        match self {
            Self::One(link) => Some(link),
            Self::Many(_) => None,
        }
    }
}

impl From<Link> for Links {
    fn from(link: Link) -> Self {
        Self::One(link)
    }
}

/// Value of an `_embedded` entry: one resource object or an ordered list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Embedded {
    /// A single embedded resource.
    One(Box<ResourceObject>),
    /// An ordered collection of embedded resources.
    Many(Vec<ResourceObject>),
}

impl Embedded {
    /// The single embedded resource, if this entry is not a list.
    #[must_use]
    pub fn as_object(&self) -> Option<&ResourceObject> {
        match self {
            Self::One(object) => Some(object),
            Self::Many(_) => None,
        }
    }

    /// The embedded list, if this entry is a list.
    #[must_use]
    pub fn as_array(&self) -> Option<&[ResourceObject]> {
        match self {
            Self::One(_) => None,
            Self::Many(objects) => Some(objects),
        }
    }
}

/// A HAL resource object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    #[serde(rename = "_links")]
    links: IndexMap<String, Links>,

    #[serde(rename = "_embedded", default)]
    embedded: IndexMap<String, Embedded>,

    #[serde(flatten)]
    properties: Map<String, Value>,
}

impl ResourceObject {
    /// Create a resource object whose `self` link points at `self_href`.
    #[must_use]
    pub fn new(self_href: impl Into<String>) -> Self {
        let mut links = IndexMap::new();
        links.insert(SELF_RELATION.to_string(), Links::One(Link::new(self_href)));
        Self {
            links,
            embedded: IndexMap::new(),
            properties: Map::new(),
        }
    }

    /// The `self` link.
    #[must_use]
    pub fn self_link(&self) -> Option<&Link> {
        self.links.get(SELF_RELATION).and_then(Links::as_link)
    }

    /// All links by relation.
    #[must_use]
    pub const fn links(&self) -> &IndexMap<String, Links> {
        &self.links
    }

    /// The link entry for `relation`.
    #[must_use]
    pub fn link(&self, relation: &str) -> Option<&Links> {
        self.links.get(relation)
    }

    /// Set the link entry for `relation`, replacing any previous one.
    pub fn set_link(&mut self, relation: impl Into<String>, links: impl Into<Links>) {
        self.links.insert(relation.into(), links.into());
    }

    /// All embedded resources by relation.
    #[must_use]
    pub const fn embedded(&self) -> &IndexMap<String, Embedded> {
        &self.embedded
    }

    /// The embedded entry for `relation`.
    #[must_use]
    pub fn embedded_entry(&self, relation: &str) -> Option<&Embedded> {
        self.embedded.get(relation)
    }

    /// Set the embedded entry for `relation`.
    pub fn set_embedded(&mut self, relation: impl Into<String>, embedded: Embedded) {
        self.embedded.insert(relation.into(), embedded);
    }

    /// Plain properties (everything but `_links` and `_embedded`).
    #[must_use]
    pub const fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// A single property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Whether a property is set.
    #[must_use]
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Set a property.
    ///
    /// The reserved keys `_links` and `_embedded` are ignored.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if is_reserved_key(&key) {
            tracing::warn!(key = %key, "Ignoring property with reserved HAL key");
            return;
        }
        self.properties.insert(key, value.into());
    }
}

/// `true` for the keys HAL reserves for links and embedded resources.
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    key == "_links" || key == "_embedded"
}
