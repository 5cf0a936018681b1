//! Sample models for tests.

use resourceful_core::Model;
use serde::{Deserialize, Serialize};

/// A book with an optional embedded author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Identifier
    #[serde(default)]
    pub id: String,
    /// Title
    pub title: String,
    /// Author, a nested object skipped by property projection
    #[serde(default)]
    pub author: Option<Author>,
    /// Keywords, an array of scalars kept by property projection
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time in epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
    /// Last modification time in epoch milliseconds
    #[serde(default)]
    pub modified_at: i64,
}

impl Book {
    /// A book without author, created and modified at 1000 ms.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: None,
            tags: Vec::new(),
            created_at: 1000,
            modified_at: 1000,
        }
    }

    /// Set the author.
    #[must_use]
    pub fn by(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.author = Some(Author {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    /// Set the modification time.
    #[must_use]
    pub const fn modified(mut self, millis: i64) -> Self {
        self.modified_at = millis;
        self
    }
}

impl Model for Book {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn modified_at(&self) -> i64 {
        self.modified_at
    }

    fn set_created_at(&mut self, millis: i64) {
        self.created_at = millis;
    }

    fn set_modified_at(&mut self, millis: i64) {
        self.modified_at = millis;
    }
}

/// A book's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Identifier
    pub id: String,
    /// Display name
    pub name: String,
}
