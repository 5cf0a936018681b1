//! # Resourceful Core
//!
//! Resource lifecycle engine for hypermedia-driven HTTP APIs in the HAL format.
//!
//! This crate turns domain models into HAL resource objects with optimistic
//! concurrency control (entity tags, conditional requests) and offset/size
//! pagination. It is transport-agnostic: a host HTTP layer hands it a parsed
//! [`state::ResourceRequest`] and writes back the [`state::ResourceResponse`].
//!
//! ## Core Concepts
//!
//! - **Resource object**: the HAL document (`_links`, `_embedded`, properties)
//! - **Builders**: chainable assembly of links, properties and embedded resources
//! - **Preconditions**: `If-None-Match`/`If-Modified-Since` for reads,
//!   `If-Match`/`If-Unmodified-Since` for writes
//! - **Pagination**: first/prev/next/last windows from an offset and size
//! - **Lifecycle**: one pipeline per request, specialised per HTTP verb
//!
//! ## Request Flow
//!
//! ```text
//! before → load / precondition / mutate → after
//!        → properties → links → embedded → verb extras
//!        → status → http response hook → send
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use resourceful_core::state::{GetState, Hooks, ResourceStateMachine};
//!
//! let response = ResourceStateMachine::new(GetState::new(&books), &request, &config)
//!     .with_hooks(Hooks::new().define_links(|b| b.with_link("collection", "/books")))
//!     .build()
//!     .await?;
//! ```

pub mod builder;
pub mod config;
pub mod etag;
pub mod hal;
pub mod metrics;
pub mod model;
pub mod pagination;
pub mod preconditions;
pub mod properties;
pub mod state;

// Re-export commonly used types
pub use builder::{ArrayBuilder, HalContext, ObjectBuilder};
pub use config::{ConfigError, HalConfig, PaginationConfig};
pub use hal::{Embedded, HAL_MEDIA_TYPE, Link, LinkOptions, Links, ResourceObject};
pub use model::Model;
pub use pagination::{CollectionResult, OffsetSizePage, OffsetSizePagination, Pagination, PaginationResult};
pub use state::{Hooks, ResourceError, ResourceRequest, ResourceResponse, ResourceStateMachine, StoreError};

/// Environment module - injected dependencies of the lifecycle engine
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// The state machines stamp `createdAt`/`modifiedAt` from this clock.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;

        /// Current time as epoch milliseconds
        fn now_millis(&self) -> i64 {
            self.now().timestamp_millis()
        }
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
