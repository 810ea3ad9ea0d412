// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Maps [`JobError`] onto the status codes in §6.1. Admission refusals each
//! get their own documented code; everything else not explicitly
//! job-domain related collapses to a 500 with a `tracing::error!` for
//! correlation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use blogcast_domain::JobError;
use serde_json::json;

pub struct ApiError(pub JobError);

impl From<JobError> for ApiError {
    fn from(e: JobError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            JobError::RateLimited(reason) => (StatusCode::TOO_MANY_REQUESTS, reason.clone()),
            JobError::QueueFull(reason) => (StatusCode::SERVICE_UNAVAILABLE, reason.clone()),
            JobError::QualityTooLow(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            JobError::ProbeUnavailable(reason) => (StatusCode::BAD_GATEWAY, reason.clone()),
            JobError::NotFound(reason) => (StatusCode::NOT_FOUND, reason.clone()),
            JobError::InvalidTransition(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            JobError::ValidationError(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            other => {
                tracing::error!(error = %other, "unhandled job error surfaced to HTTP layer");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
