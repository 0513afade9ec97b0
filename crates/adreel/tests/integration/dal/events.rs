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

//! Package and event recording against every store backend.

use adreel::{AdError, EnsureOutcome, ErrorKind};
use serde_json::json;

use crate::fixtures::{ad_payload, all_fixtures};

#[tokio::test]
async fn test_ensure_package_twice_leaves_one_package() {
    for fixture in all_fixtures().await {
        let packages = fixture.dal.packages();
        assert_eq!(packages.ensure("pkg1").await.unwrap(), EnsureOutcome::Created);
        assert_eq!(
            packages.ensure("pkg1").await.unwrap(),
            EnsureOutcome::AlreadyExists,
            "backend {}",
            fixture.name
        );

        let package = packages.get("pkg1").await.unwrap();
        assert_eq!(package.id, "pkg1");
        assert!(package.ads_events.is_empty());
    }
}

#[tokio::test]
async fn test_two_clicked_events_scenario() {
    for fixture in all_fixtures().await {
        let dal = &fixture.dal;
        let ad = dal.ads().create(&ad_payload("v1")).await.unwrap();
        dal.packages().ensure("pkg1").await.unwrap();

        for _ in 0..2 {
            dal.packages()
                .record_event("pkg1", &json!({"ad_id": ad.id, "is_clicked": true}))
                .await
                .unwrap();
        }

        let stored = dal.ads().fetch_one(&ad.id).await.unwrap();
        assert_eq!(stored.number_of_clicks, 2, "backend {}", fixture.name);
        assert_eq!(stored.number_of_impressions, 2);

        let metrics = dal.ads().analytics(&ad.id).await.unwrap();
        assert_eq!(metrics.total_revenue, 1.2);
        assert_eq!(metrics.click_impression_ratio, 1.0);

        let package = dal.packages().get("pkg1").await.unwrap();
        assert_eq!(package.ads_events.len(), 2);
        assert!(package.ads_events.iter().all(|e| e.ad_id == ad.id && e.is_clicked));
        assert!(package.ads_events[0].timestamp <= package.ads_events[1].timestamp);
    }
}

#[tokio::test]
async fn test_mixed_events_update_ratio() {
    for fixture in all_fixtures().await {
        let dal = &fixture.dal;
        let ad = dal.ads().create(&ad_payload("v1")).await.unwrap();
        dal.packages().ensure("pkg1").await.unwrap();

        for clicked in [true, false, false] {
            dal.packages()
                .record_event("pkg1", &json!({"ad_id": ad.id, "is_clicked": clicked}))
                .await
                .unwrap();
        }

        let metrics = dal.ads().analytics(&ad.id).await.unwrap();
        assert_eq!(metrics.number_of_clicks, 1, "backend {}", fixture.name);
        assert_eq!(metrics.number_of_impressions, 3);
        assert_eq!(metrics.click_impression_ratio, 0.3333);
        assert_eq!(metrics.total_revenue, 0.8);
    }
}

#[tokio::test]
async fn test_event_requires_existing_package_and_ad() {
    for fixture in all_fixtures().await {
        let dal = &fixture.dal;
        let ad = dal.ads().create(&ad_payload("v1")).await.unwrap();

        let err = dal
            .packages()
            .record_event("missing", &json!({"ad_id": ad.id, "is_clicked": false}))
            .await
            .unwrap_err();
        assert!(matches!(err, AdError::NotFound { entity: "package", .. }));

        dal.packages().ensure("pkg1").await.unwrap();
        let err = dal
            .packages()
            .record_event("pkg1", &json!({"ad_id": "no-such-ad", "is_clicked": false}))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AdError::NotFound { entity: "ad", .. }),
            "backend {}",
            fixture.name
        );

        let stored = dal.ads().fetch_one(&ad.id).await.unwrap();
        assert_eq!(stored.number_of_impressions, 0);
        assert!(dal.packages().get("pkg1").await.unwrap().ads_events.is_empty());
    }
}

#[tokio::test]
async fn test_event_payload_type_errors() {
    for fixture in all_fixtures().await {
        let err = fixture
            .dal
            .packages()
            .record_event("pkg1", &json!({"ad_id": "x", "is_clicked": "yes"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "backend {}", fixture.name);
        assert_eq!(err.to_string(), "The 'is_clicked' field should be a boolean");
    }
}

#[tokio::test]
async fn test_concurrent_events_lose_no_increments() {
    for fixture in all_fixtures().await {
        let ad = fixture.dal.ads().create(&ad_payload("v1")).await.unwrap();
        fixture.dal.packages().ensure("pkg1").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let dal = fixture.dal.clone();
            let ad_id = ad.id.clone();
            handles.push(tokio::spawn(async move {
                let payload = json!({"ad_id": ad_id, "is_clicked": i % 2 == 0});
                let result = dal.packages().record_event("pkg1", &payload).await;
                result
            }));
        }
        for handle in handles {
            handle.await.expect("task panicked").expect("record_event");
        }

        let stored = fixture.dal.ads().fetch_one(&ad.id).await.unwrap();
        assert_eq!(stored.number_of_impressions, 20, "backend {}", fixture.name);
        assert_eq!(stored.number_of_clicks, 10);
        assert_eq!(
            fixture.dal.packages().get("pkg1").await.unwrap().ads_events.len(),
            20
        );
    }
}
