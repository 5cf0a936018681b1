//! Shared router state.
//!
//! [`ResourceState`] pairs a persistence collaborator with the engine
//! configuration. Applications with several resources define their own
//! state and implement [`FromRef`] for `Arc<HalConfig>` the same way.

use axum::extract::FromRef;
use resourceful_core::HalConfig;
use std::sync::Arc;

/// Router state for a single resource.
///
/// # Examples
///
/// ```ignore
/// let state = ResourceState::new(HalConfig::from_env()?, InMemoryRepository::<Book>::new());
/// let app = Router::new()
///     .route("/books/:id", get(show))
///     .with_state(state);
/// ```
#[derive(Debug)]
pub struct ResourceState<St> {
    /// Engine configuration
    pub config: Arc<HalConfig>,
    /// Persistence collaborator
    pub store: Arc<St>,
}

impl<St> ResourceState<St> {
    /// Create the state.
    #[must_use]
    pub fn new(config: HalConfig, store: St) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }
}

impl<St> Clone for ResourceState<St> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
        }
    }
}

impl<St> FromRef<ResourceState<St>> for Arc<HalConfig> {
    fn from_ref(state: &ResourceState<St>) -> Self {
        Arc::clone(&state.config)
    }
}
