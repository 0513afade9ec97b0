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

//! # Adreel Server
//!
//! HTTP surface over the [`adreel`] core: JSON routes for ads, packages and
//! ad events, a health check, and the error mapping between the two.
//!
//! ```rust,ignore
//! use adreel::Database;
//! use adreel_server::{build_router, AppState};
//!
//! let app = build_router(AppState::new(Database::memory()));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8088").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use routes::build_router;
pub use state::AppState;
