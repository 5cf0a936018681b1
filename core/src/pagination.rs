//! Pagination engine.
//!
//! A [`Pagination`] answers, for each navigation direction, whether the
//! direction exists (`has_*`) and which page it points at. [`Pagination::build`]
//! assembles a [`PaginationResult`] with only the valid directions populated.
//!
//! [`OffsetSizePagination`] implements offset/size windows. Its boundary
//! rules are deliberately asymmetric: `last` is only offered when it lies at
//! least two windows ahead, so `last` and `next` never point at the same page.

use serde::{Deserialize, Serialize};

/// Result of a paginated storage query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResult<M> {
    /// Models inside the requested window.
    pub results: Vec<M>,
    /// Total number of models ignoring the window.
    pub total_count: u64,
}

impl<M> CollectionResult<M> {
    /// Create a collection result.
    #[must_use]
    pub const fn new(results: Vec<M>, total_count: u64) -> Self {
        Self {
            results,
            total_count,
        }
    }

    /// An empty collection.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }
}

/// Navigation pages around the current one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResult<P> {
    /// The current page, always present.
    #[serde(rename = "self")]
    pub current: P,
    /// First page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<P>,
    /// Previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<P>,
    /// Next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<P>,
    /// Last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<P>,
}

impl<P> PaginationResult<P> {
    /// Transform every populated page.
    pub fn map<Q, F>(self, mut f: F) -> PaginationResult<Q>
    where
        F: FnMut(P) -> Q,
    {
        PaginationResult {
            current: f(self.current),
            first: self.first.map(&mut f),
            prev: self.prev.map(&mut f),
            next: self.next.map(&mut f),
            last: self.last.map(&mut f),
        }
    }

    /// Transform every populated page, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<Q, E, F>(self, mut f: F) -> Result<PaginationResult<Q>, E>
    where
        F: FnMut(P) -> Result<Q, E>,
    {
        Ok(PaginationResult {
            current: f(self.current)?,
            first: self.first.map(&mut f).transpose()?,
            prev: self.prev.map(&mut f).transpose()?,
            next: self.next.map(&mut f).transpose()?,
            last: self.last.map(&mut f).transpose()?,
        })
    }

    /// Populated pages as `(relation, page)` pairs, `self` first.
    pub fn relations(&self) -> impl Iterator<Item = (&'static str, &P)> {
        [
            ("self", Some(&self.current)),
            ("first", self.first.as_ref()),
            ("prev", self.prev.as_ref()),
            ("next", self.next.as_ref()),
            ("last", self.last.as_ref()),
        ]
        .into_iter()
        .filter_map(|(relation, page)| page.map(|page| (relation, page)))
    }
}

/// Computes navigation pages for a current page.
pub trait Pagination {
    /// Page descriptor type.
    type Page: Clone;

    /// The page as requested.
    fn current(&self) -> Self::Page;

    /// Whether a first page exists.
    fn has_first(&self) -> bool;
    /// Whether a previous page exists.
    fn has_prev(&self) -> bool;
    /// Whether a next page exists.
    fn has_next(&self) -> bool;
    /// Whether a last page exists.
    fn has_last(&self) -> bool;

    /// The first page.
    fn first(&self) -> Self::Page;
    /// The previous page.
    fn prev(&self) -> Self::Page;
    /// The next page.
    fn next(&self) -> Self::Page;
    /// The last page.
    fn last(&self) -> Self::Page;

    /// Assemble the result, populating only the directions that exist.
    fn build(&self) -> PaginationResult<Self::Page> {
        PaginationResult {
            current: self.current(),
            first: self.has_first().then(|| self.first()),
            prev: self.has_prev().then(|| self.prev()),
            next: self.has_next().then(|| self.next()),
            last: self.has_last().then(|| self.last()),
        }
    }
}

/// A window into a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffsetSizePage {
    /// Index of the first model in the window.
    pub offset: u64,
    /// Number of models in the window.
    pub size: u64,
}

impl OffsetSizePage {
    /// Create a page descriptor.
    #[must_use]
    pub const fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }
}

/// Offset/size pagination over a collection of `total_count` models.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffsetSizePagination {
    offset: u64,
    size: u64,
    total_count: u64,
    default_size: u64,
    default_offset: u64,
}

impl OffsetSizePagination {
    /// Create a pagination for `current` within `total_count` models.
    #[must_use]
    pub const fn new(current: OffsetSizePage, total_count: u64) -> Self {
        Self {
            offset: current.offset,
            size: current.size,
            total_count,
            default_size: 10,
            default_offset: 0,
        }
    }

    /// Pagination for a storage result.
    #[must_use]
    pub const fn for_result<M>(result: &CollectionResult<M>, current: OffsetSizePage) -> Self {
        Self::new(current, result.total_count)
    }

    /// Override the default window used to clamp prev/next sizes.
    #[must_use]
    pub const fn with_defaults(mut self, default_size: u64, default_offset: u64) -> Self {
        self.default_size = default_size;
        self.default_offset = default_offset;
        self
    }

    /// Configured default offset.
    #[must_use]
    pub const fn default_offset(&self) -> u64 {
        self.default_offset
    }

    /// Total number of models.
    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    const fn offset_plus_two_pages(&self) -> u64 {
        self.offset.saturating_add(self.size.saturating_mul(2))
    }

    fn next_offset(&self) -> u64 {
        self.total_count
            .saturating_sub(1)
            .min(self.offset.saturating_add(self.size))
    }

    fn clamped_size(&self) -> u64 {
        self.default_size.min(self.size)
    }
}

impl Pagination for OffsetSizePagination {
    type Page = OffsetSizePage;

    fn current(&self) -> OffsetSizePage {
        OffsetSizePage::new(self.offset, self.size)
    }

    fn has_first(&self) -> bool {
        self.total_count > 0 && self.offset > self.size
    }

    fn has_prev(&self) -> bool {
        self.offset > 0 && self.total_count > 0
    }

    fn has_next(&self) -> bool {
        self.offset.saturating_add(self.size) < self.total_count
    }

    fn has_last(&self) -> bool {
        self.offset_plus_two_pages() < self.total_count
    }

    fn first(&self) -> OffsetSizePage {
        OffsetSizePage::new(0, self.size.min(self.offset.saturating_sub(self.size)))
    }

    fn prev(&self) -> OffsetSizePage {
        OffsetSizePage::new(self.offset.saturating_sub(self.size), self.clamped_size())
    }

    fn next(&self) -> OffsetSizePage {
        OffsetSizePage::new(self.next_offset(), self.clamped_size())
    }

    fn last(&self) -> OffsetSizePage {
        let offset = self
            .offset_plus_two_pages()
            .max(self.total_count.saturating_sub(self.size));
        let size = self.size.min(
            self.total_count
                .saturating_sub(self.next_offset())
                .saturating_sub(self.size),
        );
        OffsetSizePage::new(offset, size)
    }
}
