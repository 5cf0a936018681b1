//! Persistence capabilities.
//!
//! Each concrete resource supplies its storage as implementations of these
//! traits. The engine treats every call as an opaque asynchronous operation
//! that may fail. Key extraction is the store's business: it receives the
//! request and reads whatever path parameters it needs.

use crate::model::Model;
use crate::pagination::{CollectionResult, OffsetSizePage};
use crate::state::{ResourceRequest, StoreError};
use std::future::Future;

/// Storage for one model type.
pub trait ModelStore: Send + Sync {
    /// The stored model.
    type Model: Model;
}

/// Load a single model by the key in the request.
pub trait LoadModel: ModelStore {
    /// Load the addressed model, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the storage call fails.
    fn load(
        &self,
        request: &ResourceRequest,
    ) -> impl Future<Output = Result<Option<Self::Model>, StoreError>> + Send;
}

/// Load a window of a collection together with its total count.
pub trait LoadCollection: ModelStore {
    /// Load the models inside `page`.
    ///
    /// # Errors
    ///
    /// Returns error if the storage call fails.
    fn load_page(
        &self,
        request: &ResourceRequest,
        page: OffsetSizePage,
    ) -> impl Future<Output = Result<CollectionResult<Self::Model>, StoreError>> + Send;
}

/// Persist a new model.
pub trait SaveModel: ModelStore {
    /// Save `model` and return it as stored (with its assigned id).
    ///
    /// # Errors
    ///
    /// Returns error if the storage call fails.
    fn save(
        &self,
        model: Self::Model,
    ) -> impl Future<Output = Result<Self::Model, StoreError>> + Send;
}

/// Replace an existing model.
pub trait UpdateModel: ModelStore {
    /// Replace the addressed model with `model`.
    ///
    /// # Errors
    ///
    /// Returns error if the storage call fails.
    fn update(
        &self,
        request: &ResourceRequest,
        model: &Self::Model,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Delete a model by the key in the request.
pub trait DeleteModel: ModelStore {
    /// Delete the addressed model.
    ///
    /// # Errors
    ///
    /// Returns error if the storage call fails.
    fn delete(&self, request: &ResourceRequest) -> impl Future<Output = Result<(), StoreError>> + Send;
}
