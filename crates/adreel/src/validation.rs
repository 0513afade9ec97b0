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

//! Validation of untyped client payloads into typed inputs.
//!
//! Payloads arrive as JSON objects. Creation payloads are checked in two
//! passes: presence of every required field first (reporting all missing
//! names at once), then the type of each present field in declaration order.
//! Partial updates are checked against the [`AdField`] allow-list and reject
//! unknown keys.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::models::{AdField, AdFieldValue, AdPatch, NewAd, NewAdEvent};

/// Value shape accepted by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    NonEmptyText,
    Count,
    Price,
}

impl FieldKind {
    fn expected(&self) -> &'static str {
        match self {
            FieldKind::Text | FieldKind::NonEmptyText => "a string",
            FieldKind::Count => "a non-negative integer",
            FieldKind::Price => "a number",
        }
    }
}

fn kind_of(field: AdField) -> FieldKind {
    match field {
        AdField::VideoLink => FieldKind::NonEmptyText,
        AdField::AdvertiserLink | AdField::AdvertiserIcon => FieldKind::Text,
        AdField::NumberOfClicks | AdField::NumberOfImpressions => FieldKind::Count,
        AdField::PricePerClick | AdField::PricePerImpression => FieldKind::Price,
    }
}

/// Fields that must be present when creating an ad, in declaration order.
pub const REQUIRED_AD_FIELDS: [AdField; 5] = [
    AdField::VideoLink,
    AdField::AdvertiserLink,
    AdField::AdvertiserIcon,
    AdField::PricePerClick,
    AdField::PricePerImpression,
];

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationError> {
    payload.as_object().ok_or(ValidationError::NotAnObject)
}

fn invalid_type(field: &str, kind: FieldKind) -> ValidationError {
    ValidationError::InvalidType {
        field: field.to_string(),
        expected: kind.expected(),
    }
}

fn check_value(
    name: &str,
    kind: FieldKind,
    value: &Value,
) -> Result<AdFieldValue, ValidationError> {
    match kind {
        FieldKind::Text => value
            .as_str()
            .map(|s| AdFieldValue::Text(s.to_string()))
            .ok_or_else(|| invalid_type(name, kind)),
        FieldKind::NonEmptyText => match value.as_str() {
            Some("") => Err(ValidationError::EmptyField(name.to_string())),
            Some(s) => Ok(AdFieldValue::Text(s.to_string())),
            None => Err(invalid_type(name, kind)),
        },
        FieldKind::Count => match value {
            Value::Number(n) if n.is_u64() => {
                Ok(AdFieldValue::Count(n.as_u64().unwrap_or_default()))
            }
            Value::Number(n) if n.is_i64() => Err(ValidationError::NegativeValue(name.to_string())),
            _ => Err(invalid_type(name, kind)),
        },
        FieldKind::Price => match value.as_f64() {
            Some(p) if p < 0.0 => Err(ValidationError::NegativeValue(name.to_string())),
            Some(p) => Ok(AdFieldValue::Price(p)),
            None => Err(invalid_type(name, kind)),
        },
    }
}

/// Validates a single allow-listed field value.
pub fn validate_field_value(
    field: AdField,
    value: &Value,
) -> Result<AdFieldValue, ValidationError> {
    check_value(field.as_str(), kind_of(field), value)
}

/// Validates a creation payload.
///
/// Keys outside the ad schema are ignored.
pub fn validate_new_ad(payload: &Value) -> Result<NewAd, ValidationError> {
    let object = as_object(payload)?;

    let missing: Vec<String> = REQUIRED_AD_FIELDS
        .iter()
        .filter(|field| !object.contains_key(field.as_str()))
        .map(|field| field.as_str().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let text = |field: AdField| -> Result<String, ValidationError> {
        match validate_field_value(field, &object[field.as_str()])? {
            AdFieldValue::Text(s) => Ok(s),
            _ => Err(invalid_type(field.as_str(), kind_of(field))),
        }
    };
    let price = |field: AdField| -> Result<f64, ValidationError> {
        match validate_field_value(field, &object[field.as_str()])? {
            AdFieldValue::Price(p) => Ok(p),
            _ => Err(invalid_type(field.as_str(), kind_of(field))),
        }
    };
    let count = |field: AdField| -> Result<u64, ValidationError> {
        match object.get(field.as_str()) {
            None => Ok(0),
            Some(value) => match validate_field_value(field, value)? {
                AdFieldValue::Count(n) => Ok(n),
                _ => Err(invalid_type(field.as_str(), kind_of(field))),
            },
        }
    };

    Ok(NewAd {
        video_link: text(AdField::VideoLink)?,
        advertiser_link: text(AdField::AdvertiserLink)?,
        advertiser_icon: text(AdField::AdvertiserIcon)?,
        price_per_click: price(AdField::PricePerClick)?,
        price_per_impression: price(AdField::PricePerImpression)?,
        number_of_clicks: count(AdField::NumberOfClicks)?,
        number_of_impressions: count(AdField::NumberOfImpressions)?,
    })
}

/// Validates a partial update payload against the allow-list.
///
/// Every key must name an updatable field and every value must match its
/// field's type. An empty payload is rejected.
pub fn validate_patch(payload: &Value) -> Result<AdPatch, ValidationError> {
    let object = as_object(payload)?;

    let mut patch = AdPatch::default();
    for (key, value) in object {
        let field = AdField::parse(key).ok_or_else(|| ValidationError::UnknownField(key.clone()))?;
        patch.push(field, validate_field_value(field, value)?);
    }

    if patch.is_empty() {
        return Err(ValidationError::NoValidFields);
    }
    Ok(patch)
}

/// Validates the single-field update payload `{ "<field>": value }`.
///
/// Used by the per-field update endpoints; other keys in the body are ignored.
pub fn validate_single_field(field: AdField, payload: &Value) -> Result<AdPatch, ValidationError> {
    let object = as_object(payload)?;
    let value = object
        .get(field.as_str())
        .ok_or_else(|| ValidationError::MissingFields(vec![field.as_str().to_string()]))?;

    let mut patch = AdPatch::default();
    patch.push(field, validate_field_value(field, value)?);
    Ok(patch)
}

/// Validates an event-recording payload: `ad_id` string and `is_clicked` boolean.
pub fn validate_new_event(payload: &Value) -> Result<NewAdEvent, ValidationError> {
    let object = as_object(payload)?;

    let missing: Vec<String> = ["ad_id", "is_clicked"]
        .into_iter()
        .filter(|name| !object.contains_key(*name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let ad_id = object["ad_id"]
        .as_str()
        .ok_or_else(|| ValidationError::InvalidType {
            field: "ad_id".to_string(),
            expected: "a string",
        })?;
    if ad_id.is_empty() {
        return Err(ValidationError::EmptyField("ad_id".to_string()));
    }
    let is_clicked = object["is_clicked"]
        .as_bool()
        .ok_or_else(|| ValidationError::InvalidType {
            field: "is_clicked".to_string(),
            expected: "a boolean",
        })?;

    Ok(NewAdEvent {
        ad_id: ad_id.to_string(),
        is_clicked,
    })
}

/// Package names are client-supplied ids and must be non-empty.
pub fn validate_package_name(name: &str) -> Result<&str, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyField("package_name".to_string()));
    }
    Ok(name)
}
