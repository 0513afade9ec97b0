/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Document record store abstraction.
//!
//! The data access layer never talks to a database driver directly. It
//! consumes [`RecordStore`], a small document-collection contract keyed by
//! string ids:
//!
//! - point `put` / `get` / `delete`
//! - partial merge via `update_fields`
//! - atomic `increment_field` and `append_to_array_field`
//! - bulk `delete_all`
//! - uniform random `sample_one`
//! - lazy `find_all`
//!
//! Mutating calls that target a single id return the number of documents
//! matched, so callers can detect a missing record without a separate read.
//!
//! Two backends are provided: [`MemoryStore`] and, behind the `sqlite`
//! feature, [`SqliteStore`].

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// A stored document. Every document carries its key under [`ID_FIELD`].
pub type Document = Map<String, Value>;

/// Lazy, finite, single-pass sequence of documents.
pub type DocumentStream = BoxStream<'static, Result<Document, StoreError>>;

/// Field under which each document stores its own id.
pub const ID_FIELD: &str = "_id";

/// Collection holding ad records.
pub const ADS_COLLECTION: &str = "ads";

/// Collection holding package records.
pub const PACKAGES_COLLECTION: &str = "packages";

/// Failures reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate id '{id}' in collection '{collection}'")]
    Duplicate { collection: String, id: String },

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Document collection contract consumed by the data access layer.
///
/// Implementations must be safe for concurrent use by many callers, and
/// `increment_field` must be atomic with respect to concurrent increments
/// of the same field.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Inserts a new document. Fails with [`StoreError::Duplicate`] if the id exists.
    async fn put(&self, collection: &str, id: &str, document: Document) -> Result<(), StoreError>;

    /// Point lookup. Absence is `Ok(None)`.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Shallow-merges `fields` into the document. Returns the matched count.
    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<u64, StoreError>;

    /// Adds `delta` to a numeric field, treating a missing field as 0.
    /// Returns the matched count.
    async fn increment_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<u64, StoreError>;

    /// Pushes `element` onto an array field, creating the array if missing.
    /// Returns the matched count.
    async fn append_to_array_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: Value,
    ) -> Result<u64, StoreError>;

    /// Removes one document. Returns the removed count.
    async fn delete(&self, collection: &str, id: &str) -> Result<u64, StoreError>;

    /// Removes every document in the collection. Returns the removed count.
    async fn delete_all(&self, collection: &str) -> Result<u64, StoreError>;

    /// Returns one document chosen uniformly at random, or `None` when empty.
    async fn sample_one(&self, collection: &str) -> Result<Option<Document>, StoreError>;

    /// Streams every document in natural order.
    async fn find_all(&self, collection: &str) -> Result<DocumentStream, StoreError>;

    /// Cheap liveness check.
    async fn ping(&self) -> Result<(), StoreError>;
}
