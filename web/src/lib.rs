//! Axum integration for the Resourceful lifecycle engine.
//!
//! The state machines in `resourceful-core` know nothing about the HTTP
//! server. This crate is the transport side:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Axum (this crate)            │  ← HalRequest extractor
//! │  - Request parsing, URL resolution      │  ← HalResponse, AppError
//! │  - Response serialization               │  ← trace_layer
//! ├─────────────────────────────────────────┤
//! │         resourceful-core                │
//! │  - ResourceStateMachine pipeline        │
//! │  - Preconditions, pagination, HAL       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use resourceful_web::{HalRequest, HalResponse, ResourceState, WebResult, trace_layer};
//!
//! async fn show(
//!     State(state): State<ResourceState<Books>>,
//!     request: HalRequest,
//! ) -> WebResult<HalResponse> {
//!     let response = ResourceStateMachine::new(GetState::new(&*state.store), &request, &state.config)
//!         .build()
//!         .await?;
//!     Ok(response.into())
//! }
//!
//! let app = Router::new()
//!     .route("/books/:id", get(show))
//!     .layer(trace_layer())
//!     .with_state(ResourceState::new(HalConfig::from_env()?, Books::default()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use middleware::{HttpSpan, trace_layer};
pub use request::HalRequest;
pub use response::HalResponse;
pub use state::ResourceState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
