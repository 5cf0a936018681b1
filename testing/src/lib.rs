//! # Resourceful Testing
//!
//! Testing utilities and helpers for the Resourceful lifecycle engine.
//!
//! This crate provides:
//! - [`InMemoryRepository`]: storage implementing every capability trait,
//!   with call counters and failure injection
//! - [`FixedClock`]: deterministic `createdAt`/`modifiedAt` stamps
//! - [`fixtures`]: sample models
//! - [`init_tracing`]: log output for failing tests
//!
//! ## Example
//!
//! ```ignore
//! use resourceful_testing::{InMemoryRepository, fixtures::Book, request};
//!
//! #[tokio::test]
//! async fn reads_a_book() {
//!     let books = InMemoryRepository::<Book>::new();
//!     books.insert(Book::new("1", "Dune"));
//!
//!     let request = request(Method::GET, "/books/1").with_param("id", "1");
//!     let response = ResourceStateMachine::new(GetState::new(&books), &request, &config)
//!         .build()
//!         .await?;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

use chrono::{DateTime, Utc};
use http::Method;
use resourceful_core::environment::Clock;
use resourceful_core::state::ResourceRequest;

pub mod fixtures;
pub mod repository;

/// Base URL of requests built by [`request`].
pub const TEST_BASE_URL: &str = "http://localhost";

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use resourceful_testing::mocks::FixedClock;
    /// use resourceful_core::environment::Clock;
    ///
    /// let clock = FixedClock::at_millis(5_000);
    /// assert_eq!(clock.now_millis(), 5_000);
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Create a fixed clock at `millis` after the epoch.
        ///
        /// Out-of-range values fall back to the epoch.
        #[must_use]
        pub fn at_millis(millis: i64) -> Self {
            Self::new(DateTime::from_timestamp_millis(millis).unwrap_or_default())
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// A request for `path_and_query` under [`TEST_BASE_URL`].
#[must_use]
pub fn request(method: Method, path_and_query: &str) -> ResourceRequest {
    ResourceRequest::new(method, format!("{TEST_BASE_URL}{path_and_query}"), TEST_BASE_URL)
}

/// Install a test-friendly tracing subscriber once.
///
/// Honors `RUST_LOG`, defaulting to `warn`. Repeated calls are no-ops.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use repository::{InMemoryRepository, Operation};
