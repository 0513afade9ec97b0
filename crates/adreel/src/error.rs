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

//! Error types for ad and package operations.
//!
//! Every failure surfaced by the data access layer is an [`AdError`]. Its
//! [`ErrorKind`] is what a transport layer uses to pick a status code:
//! validation and not-found are client faults, the two store variants are
//! infrastructure faults.

use thiserror::Error;

use crate::store::StoreError;

/// Input that failed presence, type or allow-list checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// One or more required fields were absent. Lists every missing name.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("The '{field}' field should be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },

    #[error("The '{0}' field must not be empty")]
    EmptyField(String),

    #[error("The '{0}' field must not be negative")]
    NegativeValue(String),

    /// A partial update named a field outside the allow-list.
    #[error("Unknown or non-updatable field: '{0}'")]
    UnknownField(String),

    #[error("No valid fields to update")]
    NoValidFields,

    #[error("Request body must be a JSON object")]
    NotAnObject,
}

/// Coarse classification of an [`AdError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    StoreUnavailable,
    StoreOperation,
}

/// Errors returned by ad and package operations.
#[derive(Debug, Error)]
pub enum AdError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The store connection was never established (or was lost at startup).
    #[error("Could not connect to the database: {0}")]
    StoreUnavailable(String),

    /// The store was reachable but the operation itself failed.
    #[error("Store operation failed: {0}")]
    StoreOperation(String),
}

impl AdError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::StoreOperation(_) => ErrorKind::StoreOperation,
        }
    }

    pub fn ad_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "ad",
            id: id.into(),
        }
    }

    pub fn package_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "package",
            id: name.into(),
        }
    }
}

impl From<StoreError> for AdError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AdError::StoreUnavailable(msg),
            other => AdError::StoreOperation(other.to_string()),
        }
    }
}
