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

//! # Adreel
//!
//! Storage and accounting core for a small ad-serving backend.
//!
//! Advertisers upload video ads with a price per click and a price per
//! impression. Client applications ("packages") fetch ads to show and
//! report back every impression and click. Adreel keeps the ads, the
//! per-package event history and the running counters, and derives revenue
//! and click-through figures from them.
//!
//! ## Layers
//!
//! - [`store`]: the [`RecordStore`] document contract with in-memory and
//!   SQLite backends
//! - [`database`]: the process-wide [`Database`] handle over one store
//! - [`dal`]: ad and package operations, including validation and counters
//! - [`analytics`]: pure revenue / ratio derivation
//! - [`config`]: layered service configuration
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use adreel::{Database, DAL};
//! use serde_json::json;
//!
//! let dal = DAL::new(Database::memory());
//! let ad = dal.ads().create(&json!({
//!     "video_link": "https://cdn.example/v1.mp4",
//!     "advertiser_link": "https://example.com",
//!     "advertiser_icon": "https://example.com/icon.png",
//!     "price_per_click": 0.5,
//!     "price_per_impression": 0.1
//! })).await?;
//!
//! dal.packages().ensure("com.example.app").await?;
//! dal.packages()
//!     .record_event("com.example.app", &json!({"ad_id": ad.id, "is_clicked": true}))
//!     .await?;
//!
//! let metrics = dal.ads().analytics(&ad.id).await?;
//! assert_eq!(metrics.total_revenue, 0.6);
//! ```

pub mod analytics;
pub mod config;
pub mod dal;
pub mod database;
pub mod error;
pub mod models;
pub mod store;
pub mod validation;

pub use config::AdreelConfig;
pub use dal::DAL;
pub use database::{BackendType, Database};
pub use error::{AdError, ErrorKind, ValidationError};
pub use models::{
    Ad, AdAnalytics, AdEvent, AdField, AdPatch, DeleteAllOutcome, EnsureOutcome, NewAd,
    NewAdEvent, Package,
};
pub use store::{MemoryStore, RecordStore, StoreError};
