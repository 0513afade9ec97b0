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

//! Package routes: registration, lookup and ad event reporting.

use adreel::models::{AdEvent, EnsureOutcome, Package};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::state::AppState;

/// Package routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/package/{package_name}", post(ensure_package).get(get_package))
        .route("/package/{package_name}/ad_event", post(record_event))
}

#[derive(Debug, Serialize)]
pub struct EnsureResponse {
    pub message: &'static str,
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub message: &'static str,
    pub event: AdEvent,
}

async fn ensure_package(
    State(state): State<AppState>,
    Path(package_name): Path<String>,
) -> Result<Json<EnsureResponse>> {
    let response = match state.dal.packages().ensure(&package_name).await? {
        EnsureOutcome::Created => EnsureResponse {
            message: "Package created successfully!",
            created: true,
        },
        EnsureOutcome::AlreadyExists => EnsureResponse {
            message: "Package already exists",
            created: false,
        },
    };
    Ok(Json(response))
}

async fn get_package(
    State(state): State<AppState>,
    Path(package_name): Path<String>,
) -> Result<Json<Package>> {
    Ok(Json(state.dal.packages().get(&package_name).await?))
}

async fn record_event(
    State(state): State<AppState>,
    Path(package_name): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<EventResponse>> {
    let Json(payload) = payload?;
    let event = state
        .dal
        .packages()
        .record_event(&package_name, &payload)
        .await?;
    Ok(Json(EventResponse {
        message: "Ad event recorded successfully!",
        event,
    }))
}
