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

//! Process-wide database handle.

use adreel::Database;
use serde_json::json;
use serial_test::serial;

use crate::fixtures::ad_payload;

#[tokio::test]
#[serial]
async fn test_init_global_keeps_first_handle() {
    let first = Database::init_global(Database::memory());
    let second = Database::init_global(Database::unavailable("ignored"));

    assert!(std::ptr::eq(first, second));
    assert!(second.is_available());
    assert!(std::ptr::eq(Database::global().expect("installed"), first));
}

#[tokio::test]
#[serial]
async fn test_global_handle_is_shared() {
    let global = Database::init_global(Database::memory());
    let dal = adreel::DAL::new(global.clone());
    let ad = dal.ads().create(&ad_payload("shared")).await.unwrap();

    let other = adreel::DAL::new(Database::global().expect("installed").clone());
    assert_eq!(other.ads().fetch_one(&ad.id).await.unwrap().id, ad.id);

    other
        .ads()
        .update_partial(&ad.id, &json!({"video_link": "changed"}))
        .await
        .unwrap();
    assert_eq!(dal.ads().fetch_one(&ad.id).await.unwrap().video_link, "changed");
}
