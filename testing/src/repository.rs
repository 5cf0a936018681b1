//! In-memory persistence for lifecycle tests
//!
//! [`InMemoryRepository`] implements every storage capability, counts the
//! calls it receives and can be told to fail any operation.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on poisoned locks

use resourceful_core::Model;
use resourceful_core::pagination::{CollectionResult, OffsetSizePage};
use resourceful_core::state::{
    DeleteModel, LoadCollection, LoadModel, ModelStore, ResourceRequest, SaveModel, StoreError,
    UpdateModel,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// A storage operation of [`InMemoryRepository`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`LoadModel::load`]
    Load,
    /// [`LoadCollection::load_page`]
    LoadPage,
    /// [`SaveModel::save`]
    Save,
    /// [`UpdateModel::update`]
    Update,
    /// [`DeleteModel::delete`]
    Delete,
}

impl Operation {
    const ALL: [Self; 5] = [Self::Load, Self::LoadPage, Self::Save, Self::Update, Self::Delete];

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::LoadPage => "load_page",
            Self::Save => "save",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

type IdAssigner<M> = Arc<dyn Fn(&mut M, u64) + Send + Sync>;

/// In-memory model storage keyed by a path parameter.
///
/// Models keep insertion order, which is the order collections are paged in.
///
/// # Example
///
/// ```
/// use resourceful_testing::fixtures::Book;
/// use resourceful_testing::{InMemoryRepository, Operation};
///
/// let books = InMemoryRepository::<Book>::new();
/// books.insert(Book::new("1", "Dune"));
/// books.fail(Operation::Save);
///
/// assert_eq!(books.len(), 1);
/// assert!(books.is_failing(Operation::Save));
/// assert_eq!(books.calls(Operation::Save), 0);
/// ```
pub struct InMemoryRepository<M> {
    models: Arc<RwLock<Vec<M>>>,
    calls: Arc<[AtomicUsize; 5]>,
    failing: Arc<RwLock<HashSet<Operation>>>,
    next_id: Arc<AtomicU64>,
    assign_id: Option<IdAssigner<M>>,
    key_param: &'static str,
}

impl<M: Model + Clone> InMemoryRepository<M> {
    /// Create an empty repository addressing models by the `id` path parameter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(Default::default()),
            failing: Arc::new(RwLock::new(HashSet::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            assign_id: None,
            key_param: "id",
        }
    }

    /// Address models by another path parameter.
    #[must_use]
    pub const fn with_key_param(mut self, key_param: &'static str) -> Self {
        self.key_param = key_param;
        self
    }

    /// Give saved models sequential ids (1, 2, ...) through `assign`.
    #[must_use]
    pub fn with_id_assigner<F>(mut self, assign: F) -> Self
    where
        F: Fn(&mut M, u64) + Send + Sync + 'static,
    {
        self.assign_id = Some(Arc::new(assign));
        self
    }

    /// Store a model directly, bypassing counters and failures.
    pub fn insert(&self, model: M) {
        let mut models = self.models.write().unwrap();
        match models.iter_mut().find(|stored| stored.id() == model.id()) {
            Some(stored) => *stored = model,
            None => models.push(model),
        }
    }

    /// The stored model with `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<M> {
        self.models
            .read()
            .unwrap()
            .iter()
            .find(|model| model.id() == id)
            .cloned()
    }

    /// All stored models in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<M> {
        self.models.read().unwrap().clone()
    }

    /// Number of stored models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.read().unwrap().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.read().unwrap().is_empty()
    }

    /// Make `operation` fail with [`StoreError::Database`] until [`recover`](Self::recover).
    pub fn fail(&self, operation: Operation) {
        self.failing.write().unwrap().insert(operation);
    }

    /// Stop failing `operation`.
    pub fn recover(&self, operation: Operation) {
        self.failing.write().unwrap().remove(&operation);
    }

    /// Whether `operation` is set to fail.
    #[must_use]
    pub fn is_failing(&self, operation: Operation) -> bool {
        self.failing.read().unwrap().contains(&operation)
    }

    /// Calls received for `operation`, failed ones included.
    #[must_use]
    pub fn calls(&self, operation: Operation) -> usize {
        self.calls[operation.index()].load(Ordering::SeqCst)
    }

    /// Calls received across all operations.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        Operation::ALL.into_iter().map(|operation| self.calls(operation)).sum()
    }

    /// Reset every counter to zero.
    pub fn reset_calls(&self) {
        for counter in self.calls.iter() {
            counter.store(0, Ordering::SeqCst);
        }
    }

    fn enter(&self, operation: Operation) -> Result<(), StoreError> {
        self.calls[operation.index()].fetch_add(1, Ordering::SeqCst);
        if self.is_failing(operation) {
            return Err(StoreError::Database(format!("injected {operation} failure")));
        }
        Ok(())
    }

    fn key<'r>(&self, request: &'r ResourceRequest) -> &'r str {
        request.param(self.key_param).unwrap_or_default()
    }
}

impl<M: Model + Clone> Default for InMemoryRepository<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for InMemoryRepository<M> {
    fn clone(&self) -> Self {
        Self {
            models: Arc::clone(&self.models),
            calls: Arc::clone(&self.calls),
            failing: Arc::clone(&self.failing),
            next_id: Arc::clone(&self.next_id),
            assign_id: self.assign_id.clone(),
            key_param: self.key_param,
        }
    }
}

impl<M> fmt::Debug for InMemoryRepository<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("len", &self.models.read().map(|models| models.len()).unwrap_or_default())
            .field("key_param", &self.key_param)
            .finish_non_exhaustive()
    }
}

impl<M: Model + Clone> ModelStore for InMemoryRepository<M> {
    type Model = M;
}

impl<M: Model + Clone> LoadModel for InMemoryRepository<M> {
    async fn load(&self, request: &ResourceRequest) -> Result<Option<M>, StoreError> {
        self.enter(Operation::Load)?;
        Ok(self.get(self.key(request)))
    }
}

impl<M: Model + Clone> LoadCollection for InMemoryRepository<M> {
    async fn load_page(
        &self,
        _request: &ResourceRequest,
        page: OffsetSizePage,
    ) -> Result<CollectionResult<M>, StoreError> {
        self.enter(Operation::LoadPage)?;
        let models = self.models.read().unwrap();
        let results = models
            .iter()
            .skip(usize::try_from(page.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(page.size).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(CollectionResult::new(results, models.len() as u64))
    }
}

impl<M: Model + Clone> SaveModel for InMemoryRepository<M> {
    async fn save(&self, mut model: M) -> Result<M, StoreError> {
        self.enter(Operation::Save)?;
        if let Some(assign) = &self.assign_id {
            assign(&mut model, self.next_id.fetch_add(1, Ordering::SeqCst));
        }
        self.insert(model.clone());
        Ok(model)
    }
}

impl<M: Model + Clone> UpdateModel for InMemoryRepository<M> {
    async fn update(&self, request: &ResourceRequest, model: &M) -> Result<(), StoreError> {
        self.enter(Operation::Update)?;
        let key = self.key(request);
        let mut models = self.models.write().unwrap();
        match models.iter_mut().find(|stored| stored.id() == key) {
            Some(stored) => *stored = model.clone(),
            None => models.push(model.clone()),
        }
        Ok(())
    }
}

impl<M: Model + Clone> DeleteModel for InMemoryRepository<M> {
    async fn delete(&self, request: &ResourceRequest) -> Result<(), StoreError> {
        self.enter(Operation::Delete)?;
        let key = self.key(request);
        self.models.write().unwrap().retain(|model| model.id() != key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Book;
    use http::Method;

    fn addressed(id: &str) -> ResourceRequest {
        ResourceRequest::new(Method::GET, format!("http://h/books/{id}"), "http://h").with_param("id", id)
    }

    #[test]
    fn counts_calls_and_injects_failures() {
        let books = InMemoryRepository::<Book>::new();
        books.insert(Book::new("1", "Dune"));

        let loaded = tokio_test::block_on(books.load(&addressed("1"))).unwrap();
        assert_eq!(loaded.map(|book| book.title), Some("Dune".to_string()));

        books.fail(Operation::Load);
        assert!(tokio_test::block_on(books.load(&addressed("1"))).is_err());
        assert_eq!(books.calls(Operation::Load), 2);

        books.recover(Operation::Load);
        books.reset_calls();
        assert_eq!(books.total_calls(), 0);
    }

    #[test]
    fn pages_follow_insertion_order() {
        let books = InMemoryRepository::<Book>::new();
        for id in ["c", "a", "b"] {
            books.insert(Book::new(id, id));
        }

        let page = tokio_test::block_on(books.load_page(&addressed(""), OffsetSizePage::new(1, 5))).unwrap();
        let ids: Vec<_> = page.results.iter().map(|book| book.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(page.total_count, 3);
    }

    #[test]
    fn saves_assign_sequential_ids() {
        let books = InMemoryRepository::<Book>::new().with_id_assigner(|book, id| book.id = id.to_string());

        let first = tokio_test::block_on(books.save(Book::new("", "Emma"))).unwrap();
        let second = tokio_test::block_on(books.save(Book::new("", "Dune"))).unwrap();

        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");
        assert_eq!(books.len(), 2);
    }

    #[test]
    fn deletes_by_key() {
        let books = InMemoryRepository::<Book>::new();
        books.insert(Book::new("1", "Dune"));
        tokio_test::block_on(books.delete(&addressed("1"))).unwrap();
        assert!(books.is_empty());
    }
}
