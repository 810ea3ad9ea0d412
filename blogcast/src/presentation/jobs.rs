// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Submission, status, cancel, and delete handlers (§4.4), plus the
//! ambient `/healthz` and `/metrics` endpoints (§6.1).

use crate::infrastructure::metrics;
use crate::presentation::error_response::ApiError;
use crate::presentation::state::AppState;
use axum::extract::{ConnectInfo, FromRequest, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use blogcast_domain::repositories::job_repository::JobPatch;
use blogcast_domain::value_objects::{ClientIp, JobId, JobStatus, SourceUrl};
use blogcast_domain::{JobAggregate, JobRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub url: String,
}

/// Accepts either a JSON body or a form-encoded body, both with a single
/// `url` field (§4.4).
impl<S: Send + Sync> FromRequest<S> for SubmitRequest {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            Json::<SubmitRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()).into_response())
        } else {
            Form::<SubmitRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()).into_response())
        }
    }
}

#[derive(Debug, Serialize)]
struct JobView {
    id: String,
    status: &'static str,
    progress: u8,
    progress_message: String,
    current_step: Option<&'static str>,
    video_path: Option<String>,
    video_size: Option<u64>,
    error_message: Option<String>,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    created: chrono::DateTime<chrono::Utc>,
}

impl From<&JobRecord> for JobView {
    fn from(r: &JobRecord) -> Self {
        Self {
            id: r.id.as_str().to_string(),
            status: r.status.as_str(),
            progress: r.progress.value(),
            progress_message: r.progress_message.as_str().to_string(),
            current_step: r.current_step.map(|s| s.as_str()),
            video_path: r.video_path.clone(),
            video_size: r.video_size,
            error_message: r.error_message.clone(),
            started_at: r.started_at,
            completed_at: r.completed_at,
            created: r.created,
        }
    }
}

/// Prefers the first entry of `X-Forwarded-For`, falling back to the
/// transport peer address (§4.4, §6.1).
fn client_address(headers: &axum::http::HeaderMap, peer: SocketAddr) -> ClientIp {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match forwarded {
        Some(addr) => ClientIp::new(addr),
        None => ClientIp::new(peer.ip().to_string()),
    }
}

pub async fn submit(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: axum::http::HeaderMap,
    body: SubmitRequest,
) -> Result<Response, ApiError> {
    let url = SourceUrl::new(body.url).map_err(ApiError::from)?;
    let client_ip = client_address(&headers, peer);

    let record = state.admission().admit(url, client_ip).await.map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(JobView::from(&record))).into_response())
}

pub async fn get_status(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let id = JobId::new(id).map_err(ApiError::from)?;
    let record = state.repository().get_job(&id).await.map_err(ApiError::from)?;
    Ok(Json(JobView::from(&record)).into_response())
}

pub async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let id = JobId::new(id).map_err(ApiError::from)?;
    let record = state.repository().get_job(&id).await.map_err(ApiError::from)?;
    let now = state.time().now_utc();

    let mut agg = JobAggregate::new(record);
    let event = agg.cancel(now).map_err(ApiError::from)?;
    crate::infrastructure::logging::log_job_event(&event);

    let patch = JobPatch::default().status(JobStatus::Cancelled).completed_at(now);
    state.repository().update_job(&id, patch).await.map_err(ApiError::from)?;

    Ok(Json(json!({ "status": "cancelled" })).into_response())
}

pub async fn delete_job(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let job_id = JobId::new(id).map_err(ApiError::from)?;
    state.repository().delete_job(&job_id).await.map_err(ApiError::from)?;

    let job_dir = state.data_root().join("jobs").join(job_id.as_str());
    if let Err(e) = tokio::fs::remove_dir_all(&job_dir).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(job_id = %job_id, dir = %job_dir.display(), error = %e, "failed to remove artifact directory on delete");
        }
    }

    Ok(Json(json!({ "status": "deleted" })).into_response())
}

pub async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics() -> Response {
    match metrics::render() {
        Ok(body) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
