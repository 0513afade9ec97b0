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

//! Shared test fixtures.
//!
//! Each fixture owns a fresh, empty store. SQLite fixtures keep their
//! temporary directory alive for as long as the fixture lives.

use adreel::{Database, DAL};
use serde_json::{json, Value};
use tempfile::TempDir;

pub struct Fixture {
    pub name: &'static str,
    pub dal: DAL,
    _dir: Option<TempDir>,
}

pub fn memory_fixture() -> Fixture {
    Fixture {
        name: "memory",
        dal: DAL::new(Database::memory()),
        _dir: None,
    }
}

#[cfg(feature = "sqlite")]
pub async fn sqlite_fixture() -> Fixture {
    use adreel::config::DatabaseConfig;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("adreel.db");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", path.display()),
        pool_size: 1,
    };
    let database = Database::try_connect(&config)
        .await
        .expect("Failed to open SQLite store");

    Fixture {
        name: "sqlite",
        dal: DAL::new(database),
        _dir: Some(dir),
    }
}

/// One fixture per compiled-in backend.
pub async fn all_fixtures() -> Vec<Fixture> {
    #[allow(unused_mut)]
    let mut fixtures = vec![memory_fixture()];
    #[cfg(feature = "sqlite")]
    fixtures.push(sqlite_fixture().await);
    fixtures
}

pub fn ad_payload(video_link: &str) -> Value {
    json!({
        "video_link": video_link,
        "advertiser_link": "a1",
        "advertiser_icon": "i1",
        "price_per_click": 0.5,
        "price_per_impression": 0.1
    })
}
