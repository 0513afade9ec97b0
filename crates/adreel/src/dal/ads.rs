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

//! Ad DAL
//!
//! Creation, lookup, partial update, deletion and analytics for ads.
//! Event counters change only through the store's atomic increment or an
//! explicit client patch.

use std::sync::Arc;

use futures::TryStreamExt;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::DAL;
use crate::analytics;
use crate::error::AdError;
use crate::models::ad::{NUMBER_OF_CLICKS, NUMBER_OF_IMPRESSIONS};
use crate::models::{Ad, AdAnalytics, AdField, AdPatch, DeleteAllOutcome, NewAd};
use crate::store::{Document, RecordStore, ADS_COLLECTION, ID_FIELD};
use crate::validation;

/// Data access layer for ad operations.
#[derive(Clone)]
pub struct AdDAL<'a> {
    dal: &'a DAL,
}

fn decode(doc: Document) -> Result<Ad, AdError> {
    let id = match doc.get(ID_FIELD) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    Ad::from_document(doc)
        .map_err(|e| AdError::StoreOperation(format!("malformed ad record {}: {}", id, e)))
}

impl<'a> AdDAL<'a> {
    pub fn new(dal: &'a DAL) -> Self {
        Self { dal }
    }

    fn store(&self) -> Result<&'a Arc<dyn RecordStore>, AdError> {
        self.dal.database.store()
    }

    /// Validates an untyped payload and stores a new ad.
    pub async fn create(&self, payload: &Value) -> Result<Ad, AdError> {
        let new_ad = validation::validate_new_ad(payload)?;
        self.create_validated(new_ad).await
    }

    /// Stores an already-validated ad under a freshly generated id.
    pub async fn create_validated(&self, new_ad: NewAd) -> Result<Ad, AdError> {
        let store = self.store()?;
        let ad = Ad::from_new(Uuid::new_v4().to_string(), new_ad);
        let doc = ad
            .to_document()
            .map_err(|e| AdError::StoreOperation(e.to_string()))?;

        store.put(ADS_COLLECTION, &ad.id, doc).await?;
        info!(ad_id = %ad.id, "Ad created");
        Ok(ad)
    }

    /// Returns one ad sampled uniformly at random.
    pub async fn fetch_random(&self) -> Result<Ad, AdError> {
        match self.store()?.sample_one(ADS_COLLECTION).await? {
            Some(doc) => decode(doc),
            None => Err(AdError::NotFound {
                entity: "ad",
                id: "any".to_string(),
            }),
        }
    }

    pub async fn fetch_one(&self, id: &str) -> Result<Ad, AdError> {
        match self.store()?.get(ADS_COLLECTION, id).await? {
            Some(doc) => decode(doc),
            None => Err(AdError::ad_not_found(id)),
        }
    }

    /// Returns whether an ad with `id` exists.
    pub async fn exists(&self, id: &str) -> Result<bool, AdError> {
        Ok(self.store()?.get(ADS_COLLECTION, id).await?.is_some())
    }

    /// Returns every ad in store order.
    pub async fn fetch_all(&self) -> Result<Vec<Ad>, AdError> {
        let mut docs = self.store()?.find_all(ADS_COLLECTION).await?;
        let mut ads = Vec::new();
        while let Some(doc) = docs.try_next().await? {
            ads.push(decode(doc)?);
        }
        Ok(ads)
    }

    /// Updates exactly one field from a `{ "<field>": value }` payload.
    pub async fn update_field(
        &self,
        id: &str,
        field: AdField,
        payload: &Value,
    ) -> Result<AdPatch, AdError> {
        let patch = validation::validate_single_field(field, payload)?;
        self.apply_patch(id, &patch).await?;
        Ok(patch)
    }

    /// Validates every key of `payload` against the allow-list, then merges
    /// all of them in one store call. Nothing is written if any key fails.
    pub async fn update_partial(&self, id: &str, payload: &Value) -> Result<AdPatch, AdError> {
        let patch = validation::validate_patch(payload)?;
        self.apply_patch(id, &patch).await?;
        Ok(patch)
    }

    /// Merges a validated patch. Missing ads are detected from the matched
    /// count of the update itself.
    pub async fn apply_patch(&self, id: &str, patch: &AdPatch) -> Result<(), AdError> {
        let matched = self
            .store()?
            .update_fields(ADS_COLLECTION, id, patch.to_document())
            .await?;
        if matched == 0 {
            warn!(ad_id = %id, "Update for unknown ad");
            return Err(AdError::ad_not_found(id));
        }
        debug!(ad_id = %id, fields = patch.len(), "Ad updated");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), AdError> {
        let removed = self.store()?.delete(ADS_COLLECTION, id).await?;
        if removed == 0 {
            warn!(ad_id = %id, "Delete for unknown ad");
            return Err(AdError::ad_not_found(id));
        }
        info!(ad_id = %id, "Ad deleted");
        Ok(())
    }

    /// Removes every ad. An empty collection is reported, not treated as an error.
    pub async fn delete_all(&self) -> Result<DeleteAllOutcome, AdError> {
        let removed = self.store()?.delete_all(ADS_COLLECTION).await?;
        if removed == 0 {
            return Ok(DeleteAllOutcome::NothingToDelete);
        }
        info!(count = removed, "All ads deleted");
        Ok(DeleteAllOutcome::Deleted(removed))
    }

    pub async fn analytics(&self, id: &str) -> Result<AdAnalytics, AdError> {
        let ad = self.fetch_one(id).await?;
        Ok(analytics::analyze(&ad))
    }

    pub async fn analytics_all(&self) -> Result<Vec<AdAnalytics>, AdError> {
        Ok(self
            .fetch_all()
            .await?
            .iter()
            .map(analytics::analyze)
            .collect())
    }

    /// Counts one impression and, when `clicked`, one click. Each counter is
    /// a separate atomic increment. Returns the number of ads matched by the
    /// impression increment.
    pub(crate) async fn count_event(&self, id: &str, clicked: bool) -> Result<u64, AdError> {
        let store = self.store()?;
        let matched = store
            .increment_field(ADS_COLLECTION, id, NUMBER_OF_IMPRESSIONS, 1)
            .await?;
        if clicked && matched > 0 {
            store
                .increment_field(ADS_COLLECTION, id, NUMBER_OF_CLICKS, 1)
                .await?;
        }
        Ok(matched)
    }
}
