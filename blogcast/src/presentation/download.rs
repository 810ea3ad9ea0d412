// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Byte-range video streaming (§4.4, §6.1). Shared by `/download` and
//! `/video` - a completed job has exactly one artifact, so there is no
//! reason to distinguish the two routes at the handler level.

use crate::presentation::error_response::ApiError;
use crate::presentation::state::AppState;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use blogcast_domain::value_objects::{JobId, JobStatus};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

struct ByteRange {
    start: u64,
    end: u64,
}

/// Parses a single `bytes=start-end` range, clamping `end` to `size - 1`.
/// Returns `Ok(None)` for a missing or unparseable header (caller falls
/// back to a full response), `Err(())` when `start` is past the end of the
/// file (caller returns 416).
fn parse_range(headers: &HeaderMap, size: u64) -> Result<Option<ByteRange>, ()> {
    let Some(raw) = headers.get(header::RANGE).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };
    let Some(spec) = raw.strip_prefix("bytes=") else {
        return Ok(None);
    };
    let Some((start_raw, end_raw)) = spec.split_once('-') else {
        return Ok(None);
    };

    let Ok(start) = start_raw.parse::<u64>() else {
        return Ok(None);
    };
    if start >= size {
        return Err(());
    }
    let end = if end_raw.is_empty() {
        size - 1
    } else {
        match end_raw.parse::<u64>() {
            Ok(e) => e.min(size - 1),
            Err(_) => return Ok(None),
        }
    };
    if end < start {
        return Ok(None);
    }
    Ok(Some(ByteRange { start, end }))
}

pub async fn download(State(state): State<AppState>, Path(id): Path<String>, headers: HeaderMap) -> Result<Response, ApiError> {
    let id = JobId::new(id).map_err(ApiError::from)?;
    let record = state.repository().get_job(&id).await.map_err(ApiError::from)?;

    if record.status != JobStatus::Completed {
        return Err(ApiError::from(blogcast_domain::JobError::validation("job is not completed")));
    }
    let Some(video_path) = &record.video_path else {
        return Err(ApiError::from(blogcast_domain::JobError::NotFound("no video artifact recorded for this job".to_string())));
    };

    // `video_path` is stored relative to `data_root` (§3, §6.5); rejoin it
    // here to get back to an absolute path on disk.
    let absolute_path = state.data_root().join(video_path);

    let mut file = match tokio::fs::File::open(&absolute_path).await {
        Ok(f) => f,
        Err(_) => return Err(ApiError::from(blogcast_domain::JobError::NotFound("video artifact missing from disk".to_string()))),
    };
    let size = file.metadata().await.map_err(blogcast_domain::JobError::from).map_err(ApiError::from)?.len();
    let content_type = mime_guess::from_path(&absolute_path).first_or_octet_stream().to_string();

    match parse_range(&headers, size) {
        Err(()) => Ok((
            StatusCode::RANGE_NOT_SATISFIABLE,
            [(header::CONTENT_RANGE, format!("bytes */{size}"))],
        )
            .into_response()),
        Ok(None) => {
            let mut buf = Vec::with_capacity(size as usize);
            if file.read_to_end(&mut buf).await.is_err() {
                return Err(ApiError::from(blogcast_domain::JobError::internal("failed to read video artifact")));
            }
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CONTENT_LENGTH, size.to_string()),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                ],
                Body::from(buf),
            )
                .into_response())
        }
        Ok(Some(range)) => {
            let len = (range.end - range.start + 1) as usize;
            if file.seek(std::io::SeekFrom::Start(range.start)).await.is_err() {
                return Err(ApiError::from(blogcast_domain::JobError::internal("failed to seek video artifact")));
            }
            let mut buf = vec![0u8; len];
            if file.read_exact(&mut buf).await.is_err() {
                return Err(ApiError::from(blogcast_domain::JobError::internal("failed to read video artifact range")));
            }
            Ok((
                StatusCode::PARTIAL_CONTENT,
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CONTENT_LENGTH, len.to_string()),
                    (header::CONTENT_RANGE, format!("bytes {}-{}/{}", range.start, range.end, size)),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                ],
                Body::from(buf),
            )
                .into_response())
        }
    }
}
