// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Record Store HTTP Client (C1, §4.1)
//!
//! Implements [`JobRepository`] as a thin `reqwest` client over the external
//! record-store service. The store's storage engine is explicitly out of
//! scope (§1); this module only owns the wire contract and the admin-token
//! auth lifecycle.
//!
//! The token is cached behind an [`RwLock`] rather than re-authenticated on
//! every call. A request that comes back `401` is retried exactly once after
//! a fresh login - the store may have rotated or expired the token - and a
//! second `401` is surfaced as [`JobError::AuthFailure`] rather than looping.

use async_trait::async_trait;
use blogcast_domain::repositories::job_repository::{JobPatch, SortOrder};
use blogcast_domain::value_objects::{ClientIp, JobId, JobStatus, SourceUrl};
use blogcast_domain::{JobError, JobRecord};
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

pub struct RecordStoreClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    password: String,
    token: RwLock<Option<String>>,
}

impl RecordStoreClient {
    pub fn new(base_url: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            email: email.into(),
            password: password.into(),
            token: RwLock::new(None),
        }
    }

    async fn login(&self) -> Result<String, JobError> {
        let resp = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&LoginRequest {
                email: &self.email,
                password: &self.password,
            })
            .send()
            .await
            .map_err(|e| JobError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(JobError::AuthFailure(format!(
                "record store login failed with status {}",
                resp.status()
            )));
        }
        let body: LoginResponse = resp.json().await.map_err(|e| JobError::Transport(e.to_string()))?;
        let mut guard = self.token.write().await;
        *guard = Some(body.token.clone());
        Ok(body.token)
    }

    async fn token(&self) -> Result<String, JobError> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.login().await
    }

    /// Sends a request, attaching the cached (or freshly fetched) bearer
    /// token. Retries once after re-authenticating on a `401`.
    async fn send(&self, method: Method, path: &str, body: Option<&impl Serialize>) -> Result<reqwest::Response, JobError> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.token().await?;
        let resp = self.dispatch(method.clone(), &url, &token, body).await?;

        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        let token = self.login().await?;
        self.dispatch(method, &url, &token, body).await
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&impl Serialize>,
    ) -> Result<reqwest::Response, JobError> {
        let mut req = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        req.send().await.map_err(|e| JobError::Transport(e.to_string()))
    }

    async fn into_record(resp: reqwest::Response) -> Result<JobRecord, JobError> {
        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => resp
                .json::<WireJobRecord>()
                .await
                .map(Into::into)
                .map_err(|e| JobError::Transport(e.to_string())),
            StatusCode::NOT_FOUND => Err(JobError::NotFound(url_tail(&resp))),
            StatusCode::CONFLICT => Err(JobError::Conflict(url_tail(&resp))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(JobError::AuthFailure(url_tail(&resp))),
            status if status.is_server_error() => Err(JobError::ServerError(status.to_string())),
            status => Err(JobError::Transport(format!("unexpected status {status}"))),
        }
    }
}

fn url_tail(resp: &reqwest::Response) -> String {
    resp.url().path().to_string()
}

#[async_trait]
impl blogcast_domain::repositories::job_repository::JobRepository for RecordStoreClient {
    async fn create_job(
        &self,
        url: SourceUrl,
        client_ip: ClientIp,
        expires_at: DateTime<Utc>,
    ) -> Result<JobRecord, JobError> {
        let body = CreateJobRequest {
            url: url.as_str().to_string(),
            client_ip: client_ip.as_str().to_string(),
            expires_at,
        };
        let resp = self.send(Method::POST, "/jobs", Some(&body)).await?;
        Self::into_record(resp).await
    }

    async fn get_job(&self, id: &JobId) -> Result<JobRecord, JobError> {
        let resp = self
            .send(Method::GET, &format!("/jobs/{}", id.as_str()), None::<&()>)
            .await?;
        Self::into_record(resp).await
    }

    async fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<JobRecord, JobError> {
        let body = WireJobPatch::from(patch);
        let resp = self
            .send(Method::PATCH, &format!("/jobs/{}", id.as_str()), Some(&body))
            .await?;
        Self::into_record(resp).await
    }

    async fn delete_job(&self, id: &JobId) -> Result<(), JobError> {
        let resp = self
            .send(Method::DELETE, &format!("/jobs/{}", id.as_str()), None::<&()>)
            .await?;
        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(JobError::NotFound(id.as_str().to_string())),
            status if status.is_server_error() => Err(JobError::ServerError(status.to_string())),
            status => Err(JobError::Transport(format!("unexpected status {status}"))),
        }
    }

    async fn list_by_status(
        &self,
        status: JobStatus,
        limit: usize,
        sort: SortOrder,
    ) -> Result<Vec<JobRecord>, JobError> {
        let sort_param = match sort {
            SortOrder::OldestFirst => "oldest",
            SortOrder::NewestFirst => "newest",
        };
        let path = format!("/jobs?status={}&limit={}&sort={}", status.as_str(), limit, sort_param);
        let resp = self.send(Method::GET, &path, None::<&()>).await?;
        if !resp.status().is_success() {
            return Err(JobError::ServerError(resp.status().to_string()));
        }
        let records: Vec<WireJobRecord> = resp.json().await.map_err(|e| JobError::Transport(e.to_string()))?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn count_recent_by_ip(&self, ip: &ClientIp, since: DateTime<Utc>) -> Result<u64, JobError> {
        let path = format!(
            "/jobs/count?client_ip={}&since={}",
            urlencoding_escape(ip.as_str()),
            since.to_rfc3339()
        );
        let resp = self.send(Method::GET, &path, None::<&()>).await?;
        if !resp.status().is_success() {
            return Err(JobError::ServerError(resp.status().to_string()));
        }
        let body: CountResponse = resp.json().await.map_err(|e| JobError::Transport(e.to_string()))?;
        Ok(body.count)
    }

    async fn count_by_status(&self, status: JobStatus) -> Result<u64, JobError> {
        let path = format!("/jobs/count?status={}", status.as_str());
        let resp = self.send(Method::GET, &path, None::<&()>).await?;
        if !resp.status().is_success() {
            return Err(JobError::ServerError(resp.status().to_string()));
        }
        let body: CountResponse = resp.json().await.map_err(|e| JobError::Transport(e.to_string()))?;
        Ok(body.count)
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<JobId>, JobError> {
        let path = format!("/jobs/expired?before={}", now.to_rfc3339());
        let resp = self.send(Method::GET, &path, None::<&()>).await?;
        if !resp.status().is_success() {
            return Err(JobError::ServerError(resp.status().to_string()));
        }
        let ids: Vec<String> = resp.json().await.map_err(|e| JobError::Transport(e.to_string()))?;
        ids.into_iter().map(JobId::new).collect()
    }
}

/// Minimal percent-encoding for the one query value that can contain
/// arbitrary characters (a forwarded-for derived client address).
fn urlencoding_escape(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
                c.to_string()
            } else {
                format!("%{:02X}", c as u32)
            }
        })
        .collect()
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct CreateJobRequest {
    url: String,
    client_ip: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

/// Wire shape of a job record as served by the record store. Kept distinct
/// from [`JobRecord`] because the store's JSON field names and
/// `current_step` encoding (string or null, not a typed [`StageKind`]) are
/// transport details the domain shouldn't need to know about.
#[derive(Debug, Serialize, Deserialize)]
struct WireJobRecord {
    id: String,
    url: String,
    status: String,
    progress: u8,
    progress_message: String,
    current_step: Option<String>,
    video_path: Option<String>,
    video_size: Option<u64>,
    error_message: Option<String>,
    client_ip: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    completed_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

/// The record store encodes an unset optional date as `""` rather than
/// omitting the field or sending `null` (§4.1, §6.2). Maps that empty
/// string to `None` instead of letting chrono's `Deserialize` reject it.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|d| Some(d.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}

impl From<WireJobRecord> for JobRecord {
    fn from(w: WireJobRecord) -> Self {
        use blogcast_domain::value_objects::{Progress, ProgressMessage, StageKind};
        JobRecord {
            id: JobId::new(w.id).unwrap_or_else(|_| JobId::new("unknown").expect("literal is valid")),
            url: SourceUrl::new(w.url).unwrap_or_else(|_| SourceUrl::new("https://invalid.example").expect("literal is valid")),
            status: JobStatus::parse(&w.status).unwrap_or(JobStatus::Failed),
            progress: Progress::new(w.progress as u32).unwrap_or(Progress::ZERO),
            progress_message: ProgressMessage::new(w.progress_message),
            current_step: w.current_step.as_deref().and_then(StageKind::parse),
            video_path: w.video_path,
            video_size: w.video_size,
            error_message: w.error_message,
            client_ip: ClientIp::new(w.client_ip),
            started_at: w.started_at,
            completed_at: w.completed_at,
            expires_at: w.expires_at,
            created: w.created,
            updated: w.updated,
        }
    }
}

#[derive(Serialize, Default)]
struct WireJobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_step: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl From<JobPatch> for WireJobPatch {
    fn from(p: JobPatch) -> Self {
        Self {
            status: p.status.map(|s| s.as_str().to_string()),
            progress: p.progress,
            progress_message: p.progress_message,
            current_step: p.current_step,
            video_path: p.video_path,
            video_size: p.video_size,
            error_message: p.error_message,
            started_at: p.started_at,
            completed_at: p.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogcast_domain::repositories::JobRepository;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_wire_record(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "url": "https://example.com/post",
            "status": "pending",
            "progress": 0,
            "progress_message": "",
            "current_step": null,
            "video_path": null,
            "video_size": null,
            "error_message": null,
            "client_ip": "10.0.0.1",
            "started_at": null,
            "completed_at": null,
            "expires_at": "2030-01-01T00:00:00Z",
            "created": "2026-01-01T00:00:00Z",
            "updated": "2026-01-01T00:00:00Z",
        })
    }

    #[tokio::test]
    async fn create_job_authenticates_then_posts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/jobs"))
            .respond_with(ResponseTemplate::new(201).set_body_json(sample_wire_record("job_1")))
            .mount(&server)
            .await;

        let client = RecordStoreClient::new(server.uri(), "admin@example.com", "secret");
        let record = client
            .create_job(
                SourceUrl::new("https://example.com/post").unwrap(),
                ClientIp::new("10.0.0.1"),
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(record.id.as_str(), "job_1");
    }

    #[tokio::test]
    async fn reauthenticates_once_after_401_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs/job_1"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs/job_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_wire_record("job_1")))
            .mount(&server)
            .await;

        let client = RecordStoreClient::new(server.uri(), "admin@example.com", "secret");
        let record = client.get_job(&JobId::new("job_1").unwrap()).await.unwrap();
        assert_eq!(record.id.as_str(), "job_1");
    }

    #[tokio::test]
    async fn not_found_maps_to_job_error_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = RecordStoreClient::new(server.uri(), "admin@example.com", "secret");
        let err = client.get_job(&JobId::new("missing").unwrap()).await.unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_string_dates_deserialize_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok"})))
            .mount(&server)
            .await;

        let mut body = sample_wire_record("job_1");
        body["started_at"] = serde_json::json!("");
        body["completed_at"] = serde_json::json!("");

        Mock::given(method("GET"))
            .and(path("/jobs/job_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = RecordStoreClient::new(server.uri(), "admin@example.com", "secret");
        let record = client.get_job(&JobId::new("job_1").unwrap()).await.unwrap();
        assert_eq!(record.started_at, None);
        assert_eq!(record.completed_at, None);
    }
}
