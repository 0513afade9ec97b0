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

//! SQLite-backed record store.
//!
//! Documents live as JSON text in a single `documents` table keyed by
//! `(collection, id)`. An autoincrement `seq` column preserves insertion
//! order for `find_all`. Partial merges, increments and array appends are
//! single `UPDATE` statements built on the JSON1 functions, so each of them
//! is atomic at the database level.
//!
//! Connections come from a single-connection `deadpool-diesel` pool, so
//! callers in this process serialize on the pool rather than on the SQLite
//! write lock. Other processes sharing the file wait up to the busy timeout.

use async_trait::async_trait;
use deadpool_diesel::sqlite::{Manager, Pool, Runtime};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Text};
use futures::stream;
use serde_json::Value;
use tracing::{info, warn};

use super::{Document, DocumentStream, RecordStore, StoreError, ID_FIELD};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS documents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body TEXT NOT NULL,
    UNIQUE (collection, id)
)";

#[derive(QueryableByName)]
struct BodyRow {
    #[diesel(sql_type = Text)]
    body: String,
}

fn backend(err: DieselError) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field)
}

fn parse_body(body: &str) -> Result<Document, StoreError> {
    Ok(serde_json::from_str(body)?)
}

/// Record store persisted in a SQLite database file.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteStore(...)")
    }
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and prepares the
    /// documents table.
    ///
    /// `path` may carry a `sqlite://` prefix, which is stripped. The pool
    /// always holds one connection; a larger `pool_size` is ignored.
    pub async fn connect(path: &str, pool_size: usize) -> Result<Self, StoreError> {
        let path = path.strip_prefix("sqlite://").unwrap_or(path).to_string();
        if pool_size > 1 {
            warn!(
                requested = pool_size,
                "SQLite record store uses a single connection; ignoring pool size"
            );
        }

        let manager = Manager::new(path.clone(), Runtime::Tokio1);
        let sqlite_pool_size = 1;
        let pool = Pool::builder(manager)
            .max_size(sqlite_pool_size)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let store = Self { pool };
        store
            .interact(|conn| {
                diesel::sql_query("PRAGMA journal_mode=WAL;")
                    .execute(conn)
                    .map_err(backend)?;
                diesel::sql_query("PRAGMA busy_timeout=30000;")
                    .execute(conn)
                    .map_err(backend)?;
                diesel::sql_query(CREATE_TABLE_SQL)
                    .execute(conn)
                    .map_err(backend)?;
                Ok(())
            })
            .await?;

        info!("SQLite record store ready at '{}'", path);
        Ok(store)
    }

    async fn interact<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        conn.interact(f)
            .await
            .map_err(|e| StoreError::Backend(format!("connection task failed: {}", e)))?
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn put(
        &self,
        collection: &str,
        id: &str,
        mut document: Document,
    ) -> Result<(), StoreError> {
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        let body = serde_json::to_string(&document)?;
        let collection = collection.to_string();
        let id = id.to_string();

        self.interact(move |conn| {
            let result = diesel::sql_query(
                "INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)",
            )
            .bind::<Text, _>(&collection)
            .bind::<Text, _>(&id)
            .bind::<Text, _>(&body)
            .execute(conn);

            match result {
                Ok(_) => Ok(()),
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    Err(StoreError::Duplicate { collection, id })
                }
                Err(e) => Err(backend(e)),
            }
        })
        .await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collection = collection.to_string();
        let id = id.to_string();

        let row: Option<BodyRow> = self
            .interact(move |conn| {
                diesel::sql_query("SELECT body FROM documents WHERE collection = ? AND id = ?")
                    .bind::<Text, _>(collection)
                    .bind::<Text, _>(id)
                    .get_result::<BodyRow>(conn)
                    .optional()
                    .map_err(backend)
            })
            .await?;

        row.map(|r| parse_body(&r.body)).transpose()
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        mut fields: Document,
    ) -> Result<u64, StoreError> {
        fields.remove(ID_FIELD);
        let patch = serde_json::to_string(&fields)?;
        let collection = collection.to_string();
        let id = id.to_string();

        let matched = self
            .interact(move |conn| {
                diesel::sql_query(
                    "UPDATE documents SET body = json_patch(body, ?) \
                     WHERE collection = ? AND id = ?",
                )
                .bind::<Text, _>(patch)
                .bind::<Text, _>(collection)
                .bind::<Text, _>(id)
                .execute(conn)
                .map_err(backend)
            })
            .await?;
        Ok(matched as u64)
    }

    async fn increment_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<u64, StoreError> {
        let path = json_path(field);
        let collection = collection.to_string();
        let id = id.to_string();

        let matched = self
            .interact(move |conn| {
                diesel::sql_query(
                    "UPDATE documents \
                     SET body = json_set(body, ?, COALESCE(json_extract(body, ?), 0) + ?) \
                     WHERE collection = ? AND id = ?",
                )
                .bind::<Text, _>(&path)
                .bind::<Text, _>(&path)
                .bind::<BigInt, _>(delta)
                .bind::<Text, _>(collection)
                .bind::<Text, _>(id)
                .execute(conn)
                .map_err(backend)
            })
            .await?;
        Ok(matched as u64)
    }

    async fn append_to_array_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: Value,
    ) -> Result<u64, StoreError> {
        let path = json_path(field);
        let element = serde_json::to_string(&element)?;
        let collection = collection.to_string();
        let id = id.to_string();

        let matched = self
            .interact(move |conn| {
                diesel::sql_query(
                    "UPDATE documents \
                     SET body = json_set(body, ?, \
                         json_insert(COALESCE(json_extract(body, ?), '[]'), '$[#]', json(?))) \
                     WHERE collection = ? AND id = ?",
                )
                .bind::<Text, _>(&path)
                .bind::<Text, _>(&path)
                .bind::<Text, _>(element)
                .bind::<Text, _>(collection)
                .bind::<Text, _>(id)
                .execute(conn)
                .map_err(backend)
            })
            .await?;
        Ok(matched as u64)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<u64, StoreError> {
        let collection = collection.to_string();
        let id = id.to_string();

        let removed = self
            .interact(move |conn| {
                diesel::sql_query("DELETE FROM documents WHERE collection = ? AND id = ?")
                    .bind::<Text, _>(collection)
                    .bind::<Text, _>(id)
                    .execute(conn)
                    .map_err(backend)
            })
            .await?;
        Ok(removed as u64)
    }

    async fn delete_all(&self, collection: &str) -> Result<u64, StoreError> {
        let collection = collection.to_string();

        let removed = self
            .interact(move |conn| {
                diesel::sql_query("DELETE FROM documents WHERE collection = ?")
                    .bind::<Text, _>(collection)
                    .execute(conn)
                    .map_err(backend)
            })
            .await?;
        Ok(removed as u64)
    }

    async fn sample_one(&self, collection: &str) -> Result<Option<Document>, StoreError> {
        let collection = collection.to_string();

        let row: Option<BodyRow> = self
            .interact(move |conn| {
                diesel::sql_query(
                    "SELECT body FROM documents WHERE collection = ? ORDER BY RANDOM() LIMIT 1",
                )
                .bind::<Text, _>(collection)
                .get_result::<BodyRow>(conn)
                .optional()
                .map_err(backend)
            })
            .await?;

        row.map(|r| parse_body(&r.body)).transpose()
    }

    async fn find_all(&self, collection: &str) -> Result<DocumentStream, StoreError> {
        let collection = collection.to_string();

        let rows: Vec<BodyRow> = self
            .interact(move |conn| {
                diesel::sql_query("SELECT body FROM documents WHERE collection = ? ORDER BY seq")
                    .bind::<Text, _>(collection)
                    .load::<BodyRow>(conn)
                    .map_err(backend)
            })
            .await?;

        // Bodies are parsed as the stream is consumed.
        Ok(Box::pin(stream::iter(
            rows.into_iter().map(|row| parse_body(&row.body)),
        )))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.interact(|conn| {
            diesel::sql_query("SELECT 1")
                .execute(conn)
                .map(|_| ())
                .map_err(backend)
        })
        .await
    }
}
