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

//! In-process record store.
//!
//! Collections are insertion-ordered vectors of `(id, document)` pairs behind
//! a single `parking_lot::RwLock`. Every mutation runs under the write lock,
//! which makes increments and appends atomic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use parking_lot::RwLock;
use rand::Rng;
use serde_json::{Number, Value};

use super::{Document, DocumentStream, RecordStore, StoreError, ID_FIELD};

#[derive(Debug, Default)]
struct Collection {
    order: Vec<String>,
    docs: HashMap<String, Document>,
}

impl Collection {
    fn remove(&mut self, id: &str) -> bool {
        if self.docs.remove(id).is_some() {
            self.order.retain(|existing| existing != id);
            true
        } else {
            false
        }
    }
}

/// Record store held entirely in memory.
///
/// Cloning is cheap; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, |c| c.order.len())
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn with_document<F>(&self, collection: &str, id: &str, f: F) -> Result<u64, StoreError>
    where
        F: FnOnce(&mut Document) -> Result<(), StoreError>,
    {
        let mut collections = self.collections.write();
        match collections
            .get_mut(collection)
            .and_then(|c| c.docs.get_mut(id))
        {
            Some(doc) => {
                f(doc)?;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

fn add_to_number(current: Option<&Value>, delta: i64, field: &str) -> Result<Value, StoreError> {
    match current {
        None | Some(Value::Null) => Ok(Value::from(delta)),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i.saturating_add(delta)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u.saturating_add_signed(delta)))
            } else {
                let f = n.as_f64().unwrap_or_default() + delta as f64;
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| StoreError::Backend(format!("field '{}' is not finite", field)))
            }
        }
        Some(_) => Err(StoreError::Backend(format!(
            "cannot increment non-numeric field '{}'",
            field
        ))),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn put(
        &self,
        collection: &str,
        id: &str,
        mut document: Document,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write();
        let entry = collections.entry(collection.to_string()).or_default();
        if entry.docs.contains_key(id) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        entry.order.push(id.to_string());
        entry.docs.insert(id.to_string(), document);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|c| c.docs.get(id))
            .cloned())
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<u64, StoreError> {
        self.with_document(collection, id, |doc| {
            for (key, value) in fields {
                if key != ID_FIELD {
                    doc.insert(key, value);
                }
            }
            Ok(())
        })
    }

    async fn increment_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<u64, StoreError> {
        self.with_document(collection, id, |doc| {
            let next = add_to_number(doc.get(field), delta, field)?;
            doc.insert(field.to_string(), next);
            Ok(())
        })
    }

    async fn append_to_array_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: Value,
    ) -> Result<u64, StoreError> {
        self.with_document(collection, id, |doc| {
            match doc
                .entry(field.to_string())
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(items) => {
                    items.push(element);
                    Ok(())
                }
                _ => Err(StoreError::Backend(format!(
                    "field '{}' is not an array",
                    field
                ))),
            }
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<u64, StoreError> {
        let mut collections = self.collections.write();
        Ok(collections
            .get_mut(collection)
            .map_or(0, |c| u64::from(c.remove(id))))
    }

    async fn delete_all(&self, collection: &str) -> Result<u64, StoreError> {
        let mut collections = self.collections.write();
        Ok(collections
            .remove(collection)
            .map_or(0, |c| c.order.len() as u64))
    }

    async fn sample_one(&self, collection: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read();
        let Some(c) = collections.get(collection) else {
            return Ok(None);
        };
        if c.order.is_empty() {
            return Ok(None);
        }
        let index = rand::thread_rng().gen_range(0..c.order.len());
        Ok(c.docs.get(&c.order[index]).cloned())
    }

    async fn find_all(&self, collection: &str) -> Result<DocumentStream, StoreError> {
        let snapshot: Vec<Result<Document, StoreError>> = self
            .collections
            .read()
            .get(collection)
            .map(|c| {
                c.order
                    .iter()
                    .filter_map(|id| c.docs.get(id).cloned())
                    .map(Ok)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Box::pin(stream::iter(snapshot)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
