// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Content Quality Probe HTTP Client (C2, §4.2)
//!
//! Fetches a short summary of a candidate URL from an external summarizer
//! and applies [`judge_summary`] to it. Any transport failure, timeout, or
//! non-2xx response surfaces as `Err`, never a silent acceptance - the
//! admission controller treats an `Err` the same as an explicit rejection.

use async_trait::async_trait;
use blogcast_domain::services::quality_probe_service::{judge_summary, ProbeOutcome, QualityProbeService};
use blogcast_domain::JobError;
use serde::Deserialize;
use std::time::Duration;

pub struct HttpQualityProbeClient {
    http: reqwest::Client,
    base_url: String,
    min_chars: usize,
}

impl HttpQualityProbeClient {
    pub fn new(base_url: impl Into<String>, min_chars: usize, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client builder with only a timeout cannot fail"),
            base_url: base_url.into(),
            min_chars,
        }
    }
}

#[derive(Deserialize)]
struct SummaryResponse {
    summary: String,
}

#[async_trait]
impl QualityProbeService for HttpQualityProbeClient {
    async fn probe(&self, url: &str) -> Result<ProbeOutcome, JobError> {
        let resp = self
            .http
            .get(format!("{}/summarize", self.base_url))
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JobError::ProbeUnavailable(format!("quality probe timed out: {e}"))
                } else {
                    JobError::ProbeUnavailable(format!("quality probe unreachable: {e}"))
                }
            })?;

        if !resp.status().is_success() {
            return Err(JobError::ProbeUnavailable(format!(
                "quality probe returned status {}",
                resp.status()
            )));
        }

        let body: SummaryResponse = resp
            .json()
            .await
            .map_err(|e| JobError::ProbeUnavailable(format!("quality probe returned malformed response: {e}")))?;

        Ok(judge_summary(&body.summary, self.min_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn accepts_a_long_enough_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/summarize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"summary": "a".repeat(250)})))
            .mount(&server)
            .await;

        let client = HttpQualityProbeClient::new(server.uri(), 200, Duration::from_secs(5));
        let outcome = client.probe("https://example.com/post").await.unwrap();
        assert!(outcome.accepted);
    }

    #[tokio::test]
    async fn server_error_surfaces_as_probe_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/summarize"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = HttpQualityProbeClient::new(server.uri(), 200, Duration::from_secs(5));
        let err = client.probe("https://example.com/post").await.unwrap_err();
        assert!(matches!(err, JobError::ProbeUnavailable(_)));
    }
}
