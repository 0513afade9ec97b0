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

//! Ad DAL behaviour against every store backend.

use adreel::models::AdField;
use adreel::{AdError, DeleteAllOutcome, ErrorKind};
use serde_json::json;
use std::collections::HashSet;

use crate::fixtures::{ad_payload, all_fixtures};

#[tokio::test]
async fn test_create_then_fetch_returns_input_with_zero_counters() {
    for fixture in all_fixtures().await {
        let ads = fixture.dal.ads();
        let created = ads.create(&ad_payload("v1")).await.expect("create");
        let fetched = ads.fetch_one(&created.id).await.expect("fetch");

        assert_eq!(fetched, created, "backend {}", fixture.name);
        assert_eq!(fetched.video_link, "v1");
        assert_eq!(fetched.advertiser_link, "a1");
        assert_eq!(fetched.price_per_click, 0.5);
        assert_eq!(fetched.price_per_impression, 0.1);
        assert_eq!(fetched.number_of_clicks, 0);
        assert_eq!(fetched.number_of_impressions, 0);
    }
}

#[tokio::test]
async fn test_create_reports_every_missing_field() {
    for fixture in all_fixtures().await {
        let err = fixture
            .dal
            .ads()
            .create(&json!({"video_link": "v1"}))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: advertiser_link, advertiser_icon, \
             price_per_click, price_per_impression",
            "backend {}",
            fixture.name
        );
        assert!(fixture.dal.ads().fetch_all().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_fetch_random_with_one_ad_always_returns_it() {
    for fixture in all_fixtures().await {
        let ad = fixture.dal.ads().create(&ad_payload("only")).await.unwrap();
        for _ in 0..10 {
            let sampled = fixture.dal.ads().fetch_random().await.unwrap();
            assert_eq!(sampled.id, ad.id, "backend {}", fixture.name);
        }
    }
}

#[tokio::test]
async fn test_fetch_random_only_returns_stored_ads() {
    for fixture in all_fixtures().await {
        let mut ids = HashSet::new();
        for i in 0..3 {
            let ad = fixture
                .dal
                .ads()
                .create(&ad_payload(&format!("v{i}")))
                .await
                .unwrap();
            ids.insert(ad.id);
        }
        for _ in 0..20 {
            let sampled = fixture.dal.ads().fetch_random().await.unwrap();
            assert!(ids.contains(&sampled.id), "backend {}", fixture.name);
        }
    }
}

#[tokio::test]
async fn test_fetch_all_preserves_insertion_order() {
    for fixture in all_fixtures().await {
        let mut expected = Vec::new();
        for i in 0..4 {
            let ad = fixture
                .dal
                .ads()
                .create(&ad_payload(&format!("v{i}")))
                .await
                .unwrap();
            expected.push(ad.id);
        }

        let listed: Vec<String> = fixture
            .dal
            .ads()
            .fetch_all()
            .await
            .unwrap()
            .into_iter()
            .map(|ad| ad.id)
            .collect();
        assert_eq!(listed, expected, "backend {}", fixture.name);
    }
}

#[tokio::test]
async fn test_update_single_field_changes_only_that_field() {
    for fixture in all_fixtures().await {
        let ads = fixture.dal.ads();
        let ad = ads.create(&ad_payload("v1")).await.unwrap();

        ads.update_field(
            &ad.id,
            AdField::AdvertiserLink,
            &json!({"advertiser_link": "https://new.example"}),
        )
        .await
        .unwrap();

        let updated = ads.fetch_one(&ad.id).await.unwrap();
        assert_eq!(updated.advertiser_link, "https://new.example");
        assert_eq!(updated.advertiser_icon, ad.advertiser_icon, "backend {}", fixture.name);
        assert_eq!(updated.video_link, ad.video_link);
    }
}

#[tokio::test]
async fn test_update_single_field_requires_that_field() {
    for fixture in all_fixtures().await {
        let ads = fixture.dal.ads();
        let ad = ads.create(&ad_payload("v1")).await.unwrap();

        let err = ads
            .update_field(&ad.id, AdField::AdvertiserIcon, &json!({"icon": "x"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "backend {}", fixture.name);
    }
}

#[tokio::test]
async fn test_update_partial_is_all_or_nothing() {
    for fixture in all_fixtures().await {
        let ads = fixture.dal.ads();
        let ad = ads.create(&ad_payload("v1")).await.unwrap();

        let err = ads
            .update_partial(
                &ad.id,
                &json!({"video_link": "v2", "price_per_click": "cheap"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(ads.fetch_one(&ad.id).await.unwrap(), ad, "backend {}", fixture.name);

        let patch = ads
            .update_partial(&ad.id, &json!({"video_link": "v2", "price_per_click": 1.5}))
            .await
            .unwrap();
        assert_eq!(patch.len(), 2);

        let updated = ads.fetch_one(&ad.id).await.unwrap();
        assert_eq!(updated.video_link, "v2");
        assert_eq!(updated.price_per_click, 1.5);
        assert_eq!(updated.advertiser_link, "a1");
    }
}

#[tokio::test]
async fn test_update_partial_rejects_empty_payload() {
    for fixture in all_fixtures().await {
        let ads = fixture.dal.ads();
        let ad = ads.create(&ad_payload("v1")).await.unwrap();
        let err = ads.update_partial(&ad.id, &json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "No valid fields to update", "backend {}", fixture.name);
    }
}

#[tokio::test]
async fn test_delete_then_fetch_is_not_found() {
    for fixture in all_fixtures().await {
        let ads = fixture.dal.ads();
        let ad = ads.create(&ad_payload("v1")).await.unwrap();
        ads.delete(&ad.id).await.unwrap();

        let err = ads.fetch_one(&ad.id).await.unwrap_err();
        assert!(
            matches!(err, AdError::NotFound { entity: "ad", .. }),
            "backend {}",
            fixture.name
        );
    }
}

#[tokio::test]
async fn test_delete_all_counts_and_empties() {
    for fixture in all_fixtures().await {
        let ads = fixture.dal.ads();
        assert_eq!(ads.delete_all().await.unwrap(), DeleteAllOutcome::NothingToDelete);

        for i in 0..3 {
            ads.create(&ad_payload(&format!("v{i}"))).await.unwrap();
        }
        let outcome = ads.delete_all().await.unwrap();
        assert_eq!(outcome.deleted_count(), 3, "backend {}", fixture.name);
        assert!(ads.fetch_all().await.unwrap().is_empty());
        assert_eq!(ads.fetch_random().await.unwrap_err().kind(), ErrorKind::NotFound);
    }
}

#[tokio::test]
async fn test_analytics_for_fresh_ad() {
    for fixture in all_fixtures().await {
        let ads = fixture.dal.ads();
        let ad = ads.create(&ad_payload("v1")).await.unwrap();

        let metrics = ads.analytics(&ad.id).await.unwrap();
        assert_eq!(metrics.ad_id, ad.id);
        assert_eq!(metrics.total_revenue, 0.0);
        assert_eq!(metrics.click_impression_ratio, 0.0, "backend {}", fixture.name);

        let all = ads.analytics_all().await.unwrap();
        assert_eq!(all, vec![metrics]);
    }
}
