//! Resource lifecycle state machines.
//!
//! One pipeline ([`ResourceStateMachine`]) is parameterized by a per-verb
//! [`Lifecycle`]:
//!
//! | State | Load | Precondition | Mutation | Status |
//! |---|---|---|---|---|
//! | [`GetState`] | by key, 404 if absent | read pair, 304 if current | none | 200 |
//! | [`GetCollectionState`] | window + total count | none | none | 200 |
//! | [`PostState`] | none | none | stamp created/modified, save | 201 |
//! | [`PutState`] | none | none | stamp modified, update | 200 |
//! | [`ConditionalPutState`] | by key, 404 if absent | write pair, 412 if stale | stamp modified, update | 200 |
//! | [`DeleteState`] | none | none | delete | 200 |
//! | [`ConditionalDeleteState`] | by key, 404 if absent | write pair, 412 if stale | delete | 200 |
//!
//! Storage comes in through the capability traits in [`store`] and
//! extension points through [`Hooks`].

mod collection;
mod delete;
mod error;
mod get;
mod hooks;
mod lifecycle;
mod post;
mod put;
mod request;
mod response;
pub mod store;

pub use collection::{GetCollectionState, OFFSET_PARAM, SIZE_PARAM, page_url, requested_page};
pub use delete::{ConditionalDeleteState, DeleteState};
pub use error::{INTERNAL_MESSAGE, ResourceError, StoreError};
pub use get::{GetState, NO_CACHE};
pub use hooks::{Hooks, ModelHook, RequestHook, ResponseHook, ShapeHook};
pub use lifecycle::{Lifecycle, ResourceStateMachine, StateContext};
pub use post::{ModelFactory, PostState, model_from_body};
pub use put::{ConditionalPutState, PutState, ReplacementFactory};
pub use request::ResourceRequest;
pub use response::{ResourceResponse, ResponseDraft};
pub use store::{DeleteModel, LoadCollection, LoadModel, ModelStore, SaveModel, UpdateModel};
