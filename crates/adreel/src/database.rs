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

//! Store connection management.
//!
//! A [`Database`] is the single long-lived handle to the record store. It is
//! established once at process start and shared by every request; clones
//! reference the same underlying store.
//!
//! Connecting never aborts the process. If the store cannot be reached the
//! handle records the reason and every operation fails immediately with
//! [`AdError::StoreUnavailable`] instead of reconnecting per call.
//!
//! # Example
//!
//! ```rust,ignore
//! use adreel::config::DatabaseConfig;
//! use adreel::database::Database;
//!
//! let db = Database::connect(&DatabaseConfig::default()).await;
//! let db = Database::init_global(db);
//! ```

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{error, info, warn};

use crate::config::DatabaseConfig;
use crate::error::AdError;
use crate::store::{MemoryStore, RecordStore, StoreError};

static GLOBAL_DATABASE: OnceCell<Database> = OnceCell::new();

/// Store backend, detected from the connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// In-process store
    Memory,
    /// SQLite document table
    Sqlite,
}

impl BackendType {
    /// Detects the backend from a connection URL.
    ///
    /// Returns `None` for URLs no backend understands.
    pub fn from_url(url: &str) -> Option<Self> {
        if url == "memory" || url.starts_with("memory://") {
            return Some(BackendType::Memory);
        }

        if url.starts_with("sqlite://")
            || url.starts_with("file:")
            || url.starts_with('/')
            || url.starts_with("./")
            || url.starts_with("../")
            || url == ":memory:"
            || url.ends_with(".db")
            || url.ends_with(".sqlite")
            || url.ends_with(".sqlite3")
        {
            return Some(BackendType::Sqlite);
        }

        None
    }
}

#[derive(Debug)]
enum Connection {
    Ready(Arc<dyn RecordStore>),
    Unavailable(String),
}

/// Shared handle to the record store.
#[derive(Clone, Debug)]
pub struct Database {
    connection: Arc<Connection>,
    backend: Option<BackendType>,
}

impl Database {
    /// Wraps an already-constructed store.
    pub fn from_store(store: Arc<dyn RecordStore>, backend: BackendType) -> Self {
        Self {
            connection: Arc::new(Connection::Ready(store)),
            backend: Some(backend),
        }
    }

    /// A fresh, empty in-memory database.
    pub fn memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()), BackendType::Memory)
    }

    /// A handle whose every operation fails with `StoreUnavailable`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            connection: Arc::new(Connection::Unavailable(reason.into())),
            backend: None,
        }
    }

    /// Opens the configured store and checks it answers a ping.
    pub async fn try_connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let backend = BackendType::from_url(&config.url).ok_or_else(|| {
            StoreError::Unavailable(format!(
                "unable to detect store backend from URL '{}'",
                config.url
            ))
        })?;

        let store: Arc<dyn RecordStore> = match backend {
            BackendType::Memory => Arc::new(MemoryStore::new()),
            #[cfg(feature = "sqlite")]
            BackendType::Sqlite => Arc::new(
                crate::store::SqliteStore::connect(&config.url, config.pool_size as usize).await?,
            ),
            #[cfg(not(feature = "sqlite"))]
            BackendType::Sqlite => {
                return Err(StoreError::Unavailable(
                    "SQLite support is not compiled in".to_string(),
                ))
            }
        };

        store.ping().await?;
        info!("Record store initialized ({:?})", backend);
        Ok(Self::from_store(store, backend))
    }

    /// Like [`Database::try_connect`], but records a failure instead of
    /// returning it.
    pub async fn connect(config: &DatabaseConfig) -> Self {
        match Self::try_connect(config).await {
            Ok(db) => db,
            Err(e) => {
                error!("Could not connect to the record store: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    /// Installs the process-wide handle. Only the first call takes effect;
    /// later calls return the handle already installed.
    pub fn init_global(database: Database) -> &'static Database {
        let mut installed = false;
        let global = GLOBAL_DATABASE.get_or_init(|| {
            installed = true;
            database
        });
        if !installed {
            warn!("Global database already initialized; keeping the existing handle");
        }
        global
    }

    /// The process-wide handle, if [`Database::init_global`] has run.
    pub fn global() -> Option<&'static Database> {
        GLOBAL_DATABASE.get()
    }

    pub fn backend(&self) -> Option<BackendType> {
        self.backend
    }

    pub fn is_available(&self) -> bool {
        matches!(*self.connection, Connection::Ready(_))
    }

    /// The live store, or `StoreUnavailable` with the recorded reason.
    pub fn store(&self) -> Result<&Arc<dyn RecordStore>, AdError> {
        match &*self.connection {
            Connection::Ready(store) => Ok(store),
            Connection::Unavailable(reason) => Err(AdError::StoreUnavailable(reason.clone())),
        }
    }

    pub async fn ping(&self) -> Result<(), AdError> {
        self.store()?.ping().await.map_err(AdError::from)
    }
}
