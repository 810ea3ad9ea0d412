// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # HTTP Presentation Layer (C4, §4.4, §6.1)
//!
//! Thin axum handlers over the application layer. A handler's only job is
//! extracting the request, calling a C3/C1 operation, and mapping the
//! result onto a response - none of the admission or transition rules
//! live here.

pub mod download;
pub mod error_response;
pub mod html;
pub mod jobs;
pub mod state;

use axum::routing::{get, post};
use axum::Router;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/jobs", post(jobs::submit))
        .route("/api/jobs/{id}", get(jobs::get_status).delete(jobs::delete_job))
        .route("/api/jobs/{id}/cancel", post(jobs::cancel))
        .route("/api/jobs/{id}/download", get(download::download))
        .route("/api/jobs/{id}/video", get(download::download))
        .route("/jobs", get(html::submission_form))
        .route("/jobs/{id}", get(html::status_page))
        .route("/healthz", get(jobs::healthz))
        .route("/metrics", get(jobs::metrics))
        .with_state(state)
}
