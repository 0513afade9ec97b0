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

//! Package DAL
//!
//! Packages are client applications that show ads. Each package keeps an
//! append-only history of ad events; recording an event also bumps the
//! ad's impression (and, for clicks, click) counter.

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::DAL;
use crate::error::AdError;
use crate::models::package::ADS_EVENTS;
use crate::models::{AdEvent, EnsureOutcome, NewAdEvent, Package};
use crate::store::{StoreError, PACKAGES_COLLECTION};
use crate::validation;

/// Data access layer for package and event operations.
#[derive(Clone)]
pub struct PackageDAL<'a> {
    dal: &'a DAL,
}

impl<'a> PackageDAL<'a> {
    pub fn new(dal: &'a DAL) -> Self {
        Self { dal }
    }

    /// Creates the package if it does not exist yet.
    ///
    /// Calling this any number of times leaves exactly one package record.
    /// A concurrent creator winning the race is reported as `AlreadyExists`.
    pub async fn ensure(&self, name: &str) -> Result<EnsureOutcome, AdError> {
        let name = validation::validate_package_name(name)?;
        let store = self.dal.database.store()?;

        if store.get(PACKAGES_COLLECTION, name).await?.is_some() {
            debug!(package = %name, "Package already exists");
            return Ok(EnsureOutcome::AlreadyExists);
        }

        let doc = Package::new(name)
            .to_document()
            .map_err(|e| AdError::StoreOperation(e.to_string()))?;
        match store.put(PACKAGES_COLLECTION, name, doc).await {
            Ok(()) => {
                info!(package = %name, "Package created");
                Ok(EnsureOutcome::Created)
            }
            Err(StoreError::Duplicate { .. }) => Ok(EnsureOutcome::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the package with its full event history.
    pub async fn get(&self, name: &str) -> Result<Package, AdError> {
        let store = self.dal.database.store()?;
        match store.get(PACKAGES_COLLECTION, name).await? {
            Some(doc) => Package::from_document(doc).map_err(|e| {
                AdError::StoreOperation(format!("malformed package record {}: {}", name, e))
            }),
            None => Err(AdError::package_not_found(name)),
        }
    }

    /// Validates `payload` and records an ad event against `package_name`.
    pub async fn record_event(
        &self,
        package_name: &str,
        payload: &Value,
    ) -> Result<AdEvent, AdError> {
        let new_event = validation::validate_new_event(payload)?;
        self.record_validated_event(package_name, new_event).await
    }

    /// Records an event in three steps, each atomic on its own: append the
    /// event to the package, then count the impression, then count the
    /// click if there was one.
    pub async fn record_validated_event(
        &self,
        package_name: &str,
        new_event: NewAdEvent,
    ) -> Result<AdEvent, AdError> {
        let store = self.dal.database.store()?;

        if store.get(PACKAGES_COLLECTION, package_name).await?.is_none() {
            warn!(package = %package_name, "Event for unknown package");
            return Err(AdError::package_not_found(package_name));
        }
        if !self.dal.ads().exists(&new_event.ad_id).await? {
            warn!(package = %package_name, ad_id = %new_event.ad_id, "Event for unknown ad");
            return Err(AdError::ad_not_found(&new_event.ad_id));
        }

        let event = AdEvent::now(new_event);
        let element =
            serde_json::to_value(&event).map_err(|e| AdError::StoreOperation(e.to_string()))?;

        let matched = store
            .append_to_array_field(PACKAGES_COLLECTION, package_name, ADS_EVENTS, element)
            .await?;
        if matched == 0 {
            return Err(AdError::package_not_found(package_name));
        }

        match self.dal.ads().count_event(&event.ad_id, event.is_clicked).await {
            Ok(0) => {
                error!(
                    package = %package_name,
                    ad_id = %event.ad_id,
                    "Event recorded but the ad disappeared before its counters were updated"
                );
                Err(AdError::StoreOperation(format!(
                    "ad {} was removed while recording an event",
                    event.ad_id
                )))
            }
            Ok(_) => {
                debug!(
                    package = %package_name,
                    ad_id = %event.ad_id,
                    clicked = event.is_clicked,
                    "Ad event recorded"
                );
                Ok(event)
            }
            Err(e) => {
                error!(
                    package = %package_name,
                    ad_id = %event.ad_id,
                    "Event recorded but updating ad counters failed: {}",
                    e
                );
                Err(AdError::StoreOperation(e.to_string()))
            }
        }
    }
}
