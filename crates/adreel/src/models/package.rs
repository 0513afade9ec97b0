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

//! Package Model
//!
//! A package is one client application installation context. It owns an
//! append-only history of ad events; each event references an ad by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::Document;

/// Name of the embedded event array on a package document.
pub const ADS_EVENTS: &str = "ads_events";

/// A package and its recorded ad events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// The package name, serialized as `_id`
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub ads_events: Vec<AdEvent>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: name.into(),
            ads_events: Vec::new(),
        }
    }

    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc))
    }

    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

/// One impression of an ad, optionally also a click. Never modified once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdEvent {
    pub ad_id: String,
    /// Server-assigned at recording time
    pub timestamp: DateTime<Utc>,
    pub is_clicked: bool,
}

impl AdEvent {
    pub fn now(new_event: NewAdEvent) -> Self {
        Self {
            ad_id: new_event.ad_id,
            timestamp: Utc::now(),
            is_clicked: new_event.is_clicked,
        }
    }
}

/// Validated client input for recording an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdEvent {
    pub ad_id: String,
    pub is_clicked: bool,
}

/// Whether `EnsurePackage` created a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    AlreadyExists,
}
