// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Minimal HTML surface. Rendering internals are out of scope; these pages
//! exist so a browser can submit a URL and poll a job's status without
//! hand-crafting HTTP requests, and post to the JSON API underneath.

use crate::presentation::error_response::ApiError;
use crate::presentation::state::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use blogcast_domain::value_objects::JobId;

pub async fn submission_form() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html><head><title>blogcast</title></head>
<body>
<h1>Turn a blog post into a narrated video</h1>
<form method="post" action="/api/jobs">
  <input type="url" name="url" placeholder="https://example.com/post" required>
  <button type="submit">Submit</button>
</form>
</body></html>"#,
    )
}

pub async fn status_page(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let job_id = JobId::new(id).map_err(ApiError::from)?;
    let record = state.repository().get_job(&job_id).await.map_err(ApiError::from)?;

    let body = format!(
        r#"<!doctype html>
<html><head><title>job {id}</title></head>
<body>
<h1>Job {id}</h1>
<p>status: {status}</p>
<p>progress: {progress}%</p>
<p>message: {message}</p>
</body></html>"#,
        id = record.id.as_str(),
        status = record.status.as_str(),
        progress = record.progress.value(),
        message = record.progress_message.as_str(),
    );

    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], Html(body)).into_response())
}
