// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Admission Controller (C3, §4.3)
//!
//! Runs the rate-limit, queue-depth, and content-quality checks in that
//! fixed order, short-circuiting on the first refusal, before creating a
//! `pending` record. The order matters: it's cheapest-first so a client
//! being refused for a quota reason never pays for an outbound probe call.

use crate::infrastructure::logging::log_job_event;
use crate::infrastructure::metrics::ADMISSION_REFUSALS_TOTAL;
use blogcast_domain::repositories::job_repository::JobRepository;
use blogcast_domain::services::quality_probe_service::QualityProbeService;
use blogcast_domain::value_objects::{ClientIp, JobStatus, SourceUrl};
use blogcast_bootstrap::TimeSource;
use blogcast_domain::{JobError, JobEvent, JobRecord};
use chrono::Duration;
use std::sync::Arc;

pub struct AdmissionController {
    repository: Arc<dyn JobRepository>,
    probe: Arc<dyn QualityProbeService>,
    time: Arc<dyn TimeSource>,
    max_queue_size: u32,
    rate_limit_per_day: u32,
    job_expiry_hours: i64,
}

impl AdmissionController {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        probe: Arc<dyn QualityProbeService>,
        time: Arc<dyn TimeSource>,
        max_queue_size: u32,
        rate_limit_per_day: u32,
        job_expiry_hours: u64,
    ) -> Self {
        Self {
            repository,
            probe,
            time,
            max_queue_size,
            rate_limit_per_day,
            job_expiry_hours: job_expiry_hours as i64,
        }
    }

    pub async fn admit(&self, url: SourceUrl, client_ip: ClientIp) -> Result<JobRecord, JobError> {
        let now = self.time.now_utc();

        let since = now - Duration::hours(24);
        let recent = self.repository.count_recent_by_ip(&client_ip, since).await?;
        if recent >= self.rate_limit_per_day as u64 {
            ADMISSION_REFUSALS_TOTAL.with_label_values(&["rate_limit"]).inc();
            return Err(JobError::RateLimited("daily limit exceeded".to_string()));
        }

        let queued = self.repository.count_by_status(JobStatus::Pending).await?;
        if queued >= self.max_queue_size as u64 {
            ADMISSION_REFUSALS_TOTAL.with_label_values(&["queue_full"]).inc();
            return Err(JobError::QueueFull("queue full".to_string()));
        }

        let outcome = self.probe.probe(url.as_str()).await?;
        if !outcome.accepted {
            ADMISSION_REFUSALS_TOTAL.with_label_values(&["quality"]).inc();
            return Err(JobError::QualityTooLow(outcome.reason));
        }

        let expires_at = now + Duration::hours(self.job_expiry_hours);
        let record = self.repository.create_job(url, client_ip, expires_at).await?;
        log_job_event(&JobEvent::Admitted {
            id: record.id.clone(),
            at: now,
        });
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blogcast_domain::repositories::job_repository::{JobPatch, SortOrder};
    use blogcast_domain::services::quality_probe_service::ProbeOutcome;
    use blogcast_domain::value_objects::JobId;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    struct FixedTime(DateTime<Utc>);
    impl TimeSource for FixedTime {
        fn now_utc(&self) -> DateTime<Utc> {
            self.0
        }
        fn monotonic_now(&self) -> std::time::Instant {
            std::time::Instant::now()
        }
    }

    #[derive(Default)]
    struct FakeRepo {
        recent_count: AtomicU64,
        pending_count: AtomicU64,
        created: Mutex<Vec<SourceUrl>>,
    }

    #[async_trait]
    impl JobRepository for FakeRepo {
        async fn create_job(&self, url: SourceUrl, client_ip: ClientIp, expires_at: DateTime<Utc>) -> Result<JobRecord, JobError> {
            self.created.lock().unwrap().push(url.clone());
            Ok(JobRecord::new_pending(
                JobId::new("job_1").unwrap(),
                url,
                client_ip,
                expires_at,
                Utc::now(),
                Utc::now(),
            ))
        }
        async fn get_job(&self, _id: &JobId) -> Result<JobRecord, JobError> {
            unimplemented!()
        }
        async fn update_job(&self, _id: &JobId, _patch: JobPatch) -> Result<JobRecord, JobError> {
            unimplemented!()
        }
        async fn delete_job(&self, _id: &JobId) -> Result<(), JobError> {
            unimplemented!()
        }
        async fn list_by_status(&self, _status: JobStatus, _limit: usize, _sort: SortOrder) -> Result<Vec<JobRecord>, JobError> {
            unimplemented!()
        }
        async fn count_recent_by_ip(&self, _ip: &ClientIp, _since: DateTime<Utc>) -> Result<u64, JobError> {
            Ok(self.recent_count.load(Ordering::SeqCst))
        }
        async fn count_by_status(&self, _status: JobStatus) -> Result<u64, JobError> {
            Ok(self.pending_count.load(Ordering::SeqCst))
        }
        async fn list_expired(&self, _now: DateTime<Utc>) -> Result<Vec<JobId>, JobError> {
            unimplemented!()
        }
    }

    struct FakeProbe(bool);
    #[async_trait]
    impl QualityProbeService for FakeProbe {
        async fn probe(&self, _url: &str) -> Result<ProbeOutcome, JobError> {
            if self.0 {
                Ok(ProbeOutcome::accept())
            } else {
                Ok(ProbeOutcome::reject("too short"))
            }
        }
    }

    fn url() -> SourceUrl {
        SourceUrl::new("https://example.com/a").unwrap()
    }

    #[tokio::test]
    async fn rate_limit_short_circuits_before_probing() {
        let repo = Arc::new(FakeRepo {
            recent_count: AtomicU64::new(5),
            ..Default::default()
        });
        let controller = AdmissionController::new(repo, Arc::new(FakeProbe(true)), Arc::new(FixedTime(Utc::now())), 10, 5, 24);
        let err = controller.admit(url(), ClientIp::new("1.2.3.4")).await.unwrap_err();
        assert!(matches!(err, JobError::RateLimited(_)));
    }

    #[tokio::test]
    async fn queue_full_short_circuits_before_probing() {
        let repo = Arc::new(FakeRepo {
            pending_count: AtomicU64::new(10),
            ..Default::default()
        });
        let controller = AdmissionController::new(repo, Arc::new(FakeProbe(true)), Arc::new(FixedTime(Utc::now())), 10, 5, 24);
        let err = controller.admit(url(), ClientIp::new("1.2.3.4")).await.unwrap_err();
        assert!(matches!(err, JobError::QueueFull(_)));
    }

    #[tokio::test]
    async fn quality_rejection_prevents_creation() {
        let repo = Arc::new(FakeRepo::default());
        let controller = AdmissionController::new(repo.clone(), Arc::new(FakeProbe(false)), Arc::new(FixedTime(Utc::now())), 10, 5, 24);
        let err = controller.admit(url(), ClientIp::new("1.2.3.4")).await.unwrap_err();
        assert!(matches!(err, JobError::QualityTooLow(_)));
        assert!(repo.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn accepted_submission_creates_a_record() {
        let repo = Arc::new(FakeRepo::default());
        let controller = AdmissionController::new(repo.clone(), Arc::new(FakeProbe(true)), Arc::new(FixedTime(Utc::now())), 10, 5, 24);
        let record = controller.admit(url(), ClientIp::new("1.2.3.4")).await.unwrap();
        assert_eq!(record.status, JobStatus::Pending);
        assert_eq!(repo.created.lock().unwrap().len(), 1);
    }
}
