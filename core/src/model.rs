//! Domain model contract.
//!
//! The lifecycle engine only touches three fields of a model: its identifier
//! and the creation/modification timestamps (epoch milliseconds). Everything
//! else flows through serde when properties are projected onto a resource
//! object or when a request body is turned into a model.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A persisted domain model exposed as an HTTP resource.
///
/// # Example
///
/// ```
/// use resourceful_core::Model;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Book {
///     id: String,
///     title: String,
///     created_at: i64,
///     modified_at: i64,
/// }
///
/// impl Model for Book {
///     fn id(&self) -> String {
///         self.id.clone()
///     }
///     fn created_at(&self) -> i64 {
///         self.created_at
///     }
///     fn modified_at(&self) -> i64 {
///         self.modified_at
///     }
///     fn set_created_at(&mut self, millis: i64) {
///         self.created_at = millis;
///     }
///     fn set_modified_at(&mut self, millis: i64) {
///         self.modified_at = millis;
///     }
/// }
/// ```
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Identifier used to build the `Location` of a created resource.
    fn id(&self) -> String;

    /// Creation time in epoch milliseconds.
    fn created_at(&self) -> i64;

    /// Last modification time in epoch milliseconds.
    fn modified_at(&self) -> i64;

    /// Set the creation time.
    fn set_created_at(&mut self, millis: i64);

    /// Set the last modification time.
    fn set_modified_at(&mut self, millis: i64);
}
