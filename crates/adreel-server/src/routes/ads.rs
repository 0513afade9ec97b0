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

//! Ad routes: upload, lookup, updates, deletion and analytics.

use adreel::models::{Ad, AdAnalytics, AdField};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::state::AppState;

/// Ad routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload_ad", post(upload_ad))
        .route("/get_ad", get(get_random_ad))
        .route("/get_ad/{ad_id}", get(get_ad))
        .route("/get_all_ads", get(get_all_ads))
        .route(
            "/update_advertiser_link/{ad_id}",
            put(update_advertiser_link),
        )
        .route(
            "/update_advertiser_icon/{ad_id}",
            put(update_advertiser_icon),
        )
        .route("/update_ad/{ad_id}", patch(update_ad))
        .route("/delete_ad/{ad_id}", delete(delete_ad))
        .route("/delete_all_ads", delete(delete_all_ads))
        .route("/ad_analytics", get(all_ad_analytics))
        .route("/ad_analytics/{ad_id}", get(ad_analytics))
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub message: &'static str,
    pub updated_fields: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DeletedAllResponse {
    pub message: &'static str,
    pub deleted_count: u64,
}

// =============================================================================
// Handlers
// =============================================================================

async fn upload_ad(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let Json(payload) = payload?;
    let ad = state.dal.ads().create(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Ad uploaded successfully!",
            id: ad.id,
        }),
    ))
}

async fn get_random_ad(State(state): State<AppState>) -> Result<Json<Ad>> {
    Ok(Json(state.dal.ads().fetch_random().await?))
}

async fn get_ad(State(state): State<AppState>, Path(ad_id): Path<String>) -> Result<Json<Ad>> {
    Ok(Json(state.dal.ads().fetch_one(&ad_id).await?))
}

async fn get_all_ads(State(state): State<AppState>) -> Result<Json<Vec<Ad>>> {
    Ok(Json(state.dal.ads().fetch_all().await?))
}

async fn update_advertiser_link(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(payload) = payload?;
    state
        .dal
        .ads()
        .update_field(&ad_id, AdField::AdvertiserLink, &payload)
        .await?;
    Ok(Json(MessageResponse {
        message: "Advertiser link updated successfully!",
    }))
}

async fn update_advertiser_icon(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(payload) = payload?;
    state
        .dal
        .ads()
        .update_field(&ad_id, AdField::AdvertiserIcon, &payload)
        .await?;
    Ok(Json(MessageResponse {
        message: "Advertiser icon updated successfully!",
    }))
}

async fn update_ad(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<UpdatedResponse>> {
    let Json(payload) = payload?;
    let patch = state.dal.ads().update_partial(&ad_id, &payload).await?;
    Ok(Json(UpdatedResponse {
        message: "Ad updated successfully!",
        updated_fields: patch.fields().map(|field| field.as_str()).collect(),
    }))
}

async fn delete_ad(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.dal.ads().delete(&ad_id).await?;
    Ok(Json(MessageResponse {
        message: "Ad deleted successfully!",
    }))
}

async fn delete_all_ads(State(state): State<AppState>) -> Result<Json<DeletedAllResponse>> {
    let outcome = state.dal.ads().delete_all().await?;
    let message = match outcome.deleted_count() {
        0 => "No ads to delete",
        _ => "All ads deleted successfully!",
    };
    Ok(Json(DeletedAllResponse {
        message,
        deleted_count: outcome.deleted_count(),
    }))
}

async fn ad_analytics(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
) -> Result<Json<AdAnalytics>> {
    Ok(Json(state.dal.ads().analytics(&ad_id).await?))
}

async fn all_ad_analytics(State(state): State<AppState>) -> Result<Json<Vec<AdAnalytics>>> {
    Ok(Json(state.dal.ads().analytics_all().await?))
}
