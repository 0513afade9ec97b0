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

//! Data Access Layer
//!
//! Entity-scoped accessors over the shared [`Database`] handle. The DAL is
//! where payload validation, referential checks and counter updates happen;
//! the store underneath only moves documents.
//!
//! # Example
//!
//! ```rust,ignore
//! use adreel::dal::DAL;
//! use adreel::database::Database;
//! use serde_json::json;
//!
//! let dal = DAL::new(Database::memory());
//! let ad = dal.ads().create(&json!({
//!     "video_link": "v1",
//!     "advertiser_link": "a1",
//!     "advertiser_icon": "i1",
//!     "price_per_click": 0.5,
//!     "price_per_impression": 0.1
//! })).await?;
//!
//! dal.packages().ensure("pkg1").await?;
//! dal.packages()
//!     .record_event("pkg1", &json!({"ad_id": ad.id, "is_clicked": true}))
//!     .await?;
//! ```

use crate::database::Database;

pub mod ads;
pub mod packages;

pub use ads::AdDAL;
pub use packages::PackageDAL;

/// Entry point to all ad and package operations.
///
/// `DAL` is `Clone` and can be shared between tasks; clones reference the
/// same store.
#[derive(Clone, Debug)]
pub struct DAL {
    pub database: Database,
}

impl DAL {
    pub fn new(database: Database) -> Self {
        DAL { database }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Returns an ad DAL for ad operations.
    pub fn ads(&self) -> AdDAL<'_> {
        AdDAL::new(self)
    }

    /// Returns a package DAL for package and event operations.
    pub fn packages(&self) -> PackageDAL<'_> {
        PackageDAL::new(self)
    }
}
