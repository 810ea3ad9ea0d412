// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Worker Loop (C6, §4.6)
//!
//! A single cooperative polling loop per process: recovers jobs stranded
//! `processing` by a previous crash, launches the expiry reaper, then
//! repeatedly claims up to `max_concurrent_jobs - in_flight` pending jobs
//! and spawns a bounded task per claim. The semaphore is the only
//! concurrency control; the loop never claims more than it can
//! immediately run.

use crate::application::pipeline_runner::{PipelineOutcome, PipelineRunner};
use crate::application::progress_reporter::ProgressReporter;
use crate::application::reaper::ExpiryReaper;
use crate::infrastructure::logging::log_job_event;
use crate::infrastructure::metrics::{JOBS_COMPLETED_TOTAL, WORKER_CONCURRENCY};
use blogcast_bootstrap::shutdown::CancellationToken;
use blogcast_bootstrap::TimeSource;
use blogcast_domain::repositories::job_repository::{JobPatch, JobRepository, SortOrder};
use blogcast_domain::value_objects::JobStatus;
use blogcast_domain::{JobAggregate, JobRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub struct WorkerLoop {
    repository: Arc<dyn JobRepository>,
    runner: Arc<PipelineRunner>,
    reaper: Arc<ExpiryReaper>,
    time: Arc<dyn TimeSource>,
    poll_interval: Duration,
    semaphore: Arc<Semaphore>,
}

impl WorkerLoop {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        runner: Arc<PipelineRunner>,
        reaper: Arc<ExpiryReaper>,
        time: Arc<dyn TimeSource>,
        poll_interval: Duration,
        max_concurrent_jobs: usize,
    ) -> Self {
        Self {
            repository,
            runner,
            reaper,
            time,
            poll_interval,
            semaphore: Arc::new(Semaphore::new(max_concurrent_jobs)),
        }
    }

    pub async fn run(&self, shutdown: CancellationToken) {
        self.recover_stale_processing().await;

        let reaper = self.reaper.clone();
        let reaper_shutdown = shutdown.clone();
        tokio::spawn(async move { reaper.run(reaper_shutdown).await });

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("worker loop stopping");
                    return;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            let available = self.semaphore.available_permits();
            if available == 0 {
                continue;
            }

            let pending = match self.repository.list_by_status(JobStatus::Pending, available, SortOrder::OldestFirst).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to list pending jobs");
                    continue;
                }
            };

            for record in pending {
                let Ok(permit) = self.semaphore.clone().try_acquire_owned() else {
                    break;
                };
                WORKER_CONCURRENCY.inc();
                let repository = self.repository.clone();
                let runner = self.runner.clone();
                let time = self.time.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    process_job(repository, runner, time, record).await;
                    WORKER_CONCURRENCY.dec();
                });
            }
        }
    }

    /// Marks any record left `processing` by a crashed prior instance as
    /// `failed` without invoking the pipeline runner for it (§4.6 step 1).
    async fn recover_stale_processing(&self) {
        let stuck = match self.repository.list_by_status(JobStatus::Processing, usize::MAX, SortOrder::OldestFirst).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list stale processing jobs during recovery");
                return;
            }
        };
        let now = self.time.now_utc();
        for record in stuck {
            let id = record.id.clone();
            let mut agg = JobAggregate::new(record);
            let event = match agg.fail("recovered: stranded in processing at startup".to_string(), now) {
                Ok(event) => event,
                Err(_) => continue,
            };
            log_job_event(&event);
            let patch = JobPatch::default()
                .status(JobStatus::Failed)
                .error("recovered: stranded in processing at startup")
                .completed_at(now);
            if let Err(e) = self.repository.update_job(&id, patch).await {
                tracing::warn!(job_id = %id, error = %e, "failed to persist recovery of stranded job");
            } else {
                JOBS_COMPLETED_TOTAL.with_label_values(&["failed"]).inc();
            }
        }
    }
}

async fn process_job(repository: Arc<dyn JobRepository>, runner: Arc<PipelineRunner>, time: Arc<dyn TimeSource>, record: JobRecord) {
    let job_id = record.id.clone();
    let now = time.now_utc();

    let mut agg = JobAggregate::new(record);
    match agg.claim(now) {
        Ok(event) => log_job_event(&event),
        Err(_) => {
            tracing::warn!(job_id = %job_id, "job could not be claimed, likely cancelled between listing and claim");
            return;
        }
    }

    let claim_patch = JobPatch::default()
        .status(JobStatus::Processing)
        .progress(0)
        .current_step(None)
        .started_at(now);
    if let Err(e) = repository.update_job(&job_id, claim_patch).await {
        tracing::warn!(job_id = %job_id, error = %e, "failed to persist job claim");
        return;
    }

    let reporter = ProgressReporter::new(repository.clone(), job_id.clone());
    let outcome = runner.run(agg.record(), &reporter).await;
    reporter.shutdown().await;

    let now = time.now_utc();
    match outcome {
        Ok(PipelineOutcome::Completed { video_path, video_size }) => {
            if let Ok(event) = agg.complete(video_path.to_string_lossy().into_owned(), video_size, now) {
                log_job_event(&event);
                let patch = JobPatch::default()
                    .status(JobStatus::Completed)
                    .progress(100)
                    .video(video_path.to_string_lossy().into_owned(), video_size)
                    .completed_at(now);
                let _ = repository.update_job(&job_id, patch).await;
                JOBS_COMPLETED_TOTAL.with_label_values(&["completed"]).inc();
            }
        }
        Ok(PipelineOutcome::Cancelled) => {
            tracing::info!(job_id = %job_id, "job processing stopped: cancelled");
            JOBS_COMPLETED_TOTAL.with_label_values(&["cancelled"]).inc();
        }
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "pipeline run failed");
            if let Ok(event) = agg.fail(e.to_string(), now) {
                log_job_event(&event);
                let patch = JobPatch::default().status(JobStatus::Failed).error(e.to_string()).completed_at(now);
                let _ = repository.update_job(&job_id, patch).await;
            }
            JOBS_COMPLETED_TOTAL.with_label_values(&["failed"]).inc();
        }
    }
}
