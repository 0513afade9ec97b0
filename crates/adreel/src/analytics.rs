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

//! Revenue and click-through derivation.

use crate::models::{Ad, AdAnalytics};

/// Rounds `value` to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `price_per_click * clicks + price_per_impression * impressions`, to 2 places.
pub fn total_revenue(ad: &Ad) -> f64 {
    let revenue = ad.price_per_click * ad.number_of_clicks as f64
        + ad.price_per_impression * ad.number_of_impressions as f64;
    round_to(revenue, 2)
}

/// Clicks per impression to 4 places; 0 when there are no impressions.
pub fn click_impression_ratio(ad: &Ad) -> f64 {
    if ad.number_of_impressions == 0 {
        return 0.0;
    }
    round_to(
        ad.number_of_clicks as f64 / ad.number_of_impressions as f64,
        4,
    )
}

/// Derives the analytics view of an ad without touching the store.
pub fn analyze(ad: &Ad) -> AdAnalytics {
    AdAnalytics {
        ad_id: ad.id.clone(),
        number_of_clicks: ad.number_of_clicks,
        number_of_impressions: ad.number_of_impressions,
        price_per_click: ad.price_per_click,
        price_per_impression: ad.price_per_impression,
        total_revenue: total_revenue(ad),
        click_impression_ratio: click_impression_ratio(ad),
    }
}
