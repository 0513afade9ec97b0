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

//! Ad Model
//!
//! Domain structures for advertisement records, their creation payloads,
//! allow-listed partial updates and derived analytics.
//!
//! Stored ads have gone through several revisions: the earliest carried only
//! links, a later one added the advertiser icon, the current one adds prices
//! and counters. [`Ad`] is the richest shape; every field a legacy record may
//! lack deserializes to an explicit default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::Document;

/// Name of the click counter field.
pub const NUMBER_OF_CLICKS: &str = "number_of_clicks";
/// Name of the impression counter field.
pub const NUMBER_OF_IMPRESSIONS: &str = "number_of_impressions";

/// An advertisement creative with its commercial terms and counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    /// Server-generated UUID, serialized as `_id`
    #[serde(rename = "_id")]
    pub id: String,
    /// Link to the video creative
    pub video_link: String,
    /// Link to the advertiser's site
    pub advertiser_link: String,
    /// Link to the advertiser's icon; absent on the oldest records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertiser_icon: Option<String>,
    #[serde(default)]
    pub price_per_click: f64,
    #[serde(default)]
    pub price_per_impression: f64,
    #[serde(default)]
    pub number_of_clicks: u64,
    #[serde(default)]
    pub number_of_impressions: u64,
}

impl Ad {
    /// Builds a stored ad from a validated creation payload.
    pub fn from_new(id: String, new_ad: NewAd) -> Self {
        Self {
            id,
            video_link: new_ad.video_link,
            advertiser_link: new_ad.advertiser_link,
            advertiser_icon: Some(new_ad.advertiser_icon),
            price_per_click: new_ad.price_per_click,
            price_per_impression: new_ad.price_per_impression,
            number_of_clicks: new_ad.number_of_clicks,
            number_of_impressions: new_ad.number_of_impressions,
        }
    }

    /// Decodes a stored document, normalizing a non-string `_id` to its
    /// string form.
    pub fn from_document(mut doc: Document) -> Result<Self, serde_json::Error> {
        if let Some(id) = doc.get("_id").filter(|v| !v.is_string()).cloned() {
            doc.insert("_id".to_string(), Value::String(id.to_string()));
        }
        serde_json::from_value(Value::Object(doc))
    }

    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

/// Validated payload for creating an ad.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAd {
    pub video_link: String,
    pub advertiser_link: String,
    pub advertiser_icon: String,
    pub price_per_click: f64,
    pub price_per_impression: f64,
    pub number_of_clicks: u64,
    pub number_of_impressions: u64,
}

/// Fields a client may change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdField {
    AdvertiserIcon,
    AdvertiserLink,
    VideoLink,
    NumberOfClicks,
    NumberOfImpressions,
    PricePerClick,
    PricePerImpression,
}

impl AdField {
    /// The update allow-list.
    pub const ALL: [AdField; 7] = [
        AdField::AdvertiserIcon,
        AdField::AdvertiserLink,
        AdField::VideoLink,
        AdField::NumberOfClicks,
        AdField::NumberOfImpressions,
        AdField::PricePerClick,
        AdField::PricePerImpression,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdField::AdvertiserIcon => "advertiser_icon",
            AdField::AdvertiserLink => "advertiser_link",
            AdField::VideoLink => "video_link",
            AdField::NumberOfClicks => NUMBER_OF_CLICKS,
            AdField::NumberOfImpressions => NUMBER_OF_IMPRESSIONS,
            AdField::PricePerClick => "price_per_click",
            AdField::PricePerImpression => "price_per_impression",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl std::fmt::Display for AdField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validated field value.
#[derive(Debug, Clone, PartialEq)]
pub enum AdFieldValue {
    Text(String),
    Count(u64),
    Price(f64),
}

impl From<&AdFieldValue> for Value {
    fn from(value: &AdFieldValue) -> Self {
        match value {
            AdFieldValue::Text(s) => Value::String(s.clone()),
            AdFieldValue::Count(n) => Value::from(*n),
            AdFieldValue::Price(p) => Value::from(*p),
        }
    }
}

/// A validated, non-empty set of field changes, applied as one merge.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdPatch {
    changes: Vec<(AdField, AdFieldValue)>,
}

impl AdPatch {
    pub(crate) fn push(&mut self, field: AdField, value: AdFieldValue) {
        self.changes.retain(|(existing, _)| *existing != field);
        self.changes.push((field, value));
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = AdField> + '_ {
        self.changes.iter().map(|(field, _)| *field)
    }

    pub fn to_document(&self) -> Document {
        self.changes
            .iter()
            .map(|(field, value)| (field.as_str().to_string(), Value::from(value)))
            .collect()
    }
}

/// Derived performance metrics for one ad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdAnalytics {
    pub ad_id: String,
    pub number_of_clicks: u64,
    pub number_of_impressions: u64,
    pub price_per_click: f64,
    pub price_per_impression: f64,
    /// Rounded to 2 decimal places
    pub total_revenue: f64,
    /// Clicks per impression, rounded to 4 decimal places; 0 without impressions
    pub click_impression_ratio: f64,
}

/// Result of deleting every ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAllOutcome {
    NothingToDelete,
    Deleted(u64),
}

impl DeleteAllOutcome {
    pub fn deleted_count(&self) -> u64 {
        match self {
            DeleteAllOutcome::NothingToDelete => 0,
            DeleteAllOutcome::Deleted(n) => *n,
        }
    }
}
