// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Progress Reporter (C8, §4.8)
//!
//! Bound to a single in-flight job. [`ProgressSink::report`] and
//! [`CancellationSignal::is_cancelled`] are both synchronous per the
//! domain's stage-invocation contract - stages must not need a `tokio`
//! handle just to report progress - so persistence is pushed onto a
//! background task over an unbounded channel rather than awaited inline.
//! The same background task owns the cancellation cache, polling the
//! store at most once per 2 s and exposing the result as an atomic the
//! sync trait method can read for free.

use blogcast_domain::repositories::job_repository::JobPatch;
use blogcast_domain::repositories::stage_executor::{CancellationSignal, ProgressSink};
use blogcast_domain::services::progress_policy;
use blogcast_domain::value_objects::{JobId, JobStatus, Progress, ProgressMessage, StageKind};
use blogcast_domain::repositories::job_repository::JobRepository;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Elides a persist when the numeric delta is this small and the message
/// is unchanged, unless the update lands on a band boundary (§4.8).
const ELIDE_DELTA: u8 = 1;

enum PersistCmd {
    Progress { stage: StageKind, pct: Progress, message: ProgressMessage },
    Finalize { pct: Progress, message: ProgressMessage },
}

struct LastPersisted {
    pct: Progress,
    message: ProgressMessage,
}

pub struct ProgressReporter {
    job_id: JobId,
    current_stage: Mutex<StageKind>,
    last: Mutex<LastPersisted>,
    cancelled: Arc<AtomicBool>,
    tx: UnboundedSender<PersistCmd>,
    task: JoinHandle<()>,
}

impl ProgressReporter {
    pub fn new(repository: Arc<dyn JobRepository>, job_id: JobId) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PersistCmd>();
        let cancelled = Arc::new(AtomicBool::new(false));
        let task_cancelled = cancelled.clone();
        let task_job_id = job_id.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CANCEL_POLL_INTERVAL);
            loop {
                tokio::select! {
                    cmd = rx.recv() => {
                        let Some(cmd) = cmd else { break };
                        let patch = match cmd {
                            PersistCmd::Progress { stage, pct, message } => JobPatch::default()
                                .progress(pct.value())
                                .progress_message(message.as_str())
                                .current_step(Some(stage.as_str().to_string())),
                            PersistCmd::Finalize { pct, message } => JobPatch::default()
                                .progress(pct.value())
                                .progress_message(message.as_str()),
                        };
                        if let Err(e) = repository.update_job(&task_job_id, patch).await {
                            tracing::warn!(job_id = %task_job_id, error = %e, "progress persist failed");
                        }
                    }
                    _ = ticker.tick() => {
                        match repository.get_job(&task_job_id).await {
                            Ok(record) => task_cancelled.store(record.status == JobStatus::Cancelled, Ordering::Relaxed),
                            Err(e) => tracing::warn!(job_id = %task_job_id, error = %e, "cancellation poll failed"),
                        }
                    }
                }
            }
        });

        Self {
            job_id,
            current_stage: Mutex::new(StageKind::Script),
            last: Mutex::new(LastPersisted {
                pct: Progress::ZERO,
                message: ProgressMessage::default(),
            }),
            cancelled,
            tx,
            task,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Records which stage is now running; subsequent `report` calls are
    /// rebased onto its band.
    pub fn set_step(&self, stage: StageKind) {
        *self.current_stage.lock().unwrap() = stage;
    }

    /// Forces a persist at the current stage's band end, bypassing
    /// elision. Called once a stage completes successfully.
    pub fn finalise(&self, message: ProgressMessage) {
        let stage = *self.current_stage.lock().unwrap();
        let pct = Progress::new(stage.band().1 as u32).expect("band end is always <= 100");
        {
            let mut last = self.last.lock().unwrap();
            last.pct = last.pct.max(pct);
            last.message = message.clone();
        }
        let _ = self.tx.send(PersistCmd::Finalize { pct, message });
    }

    /// Gracefully stops the background task; callers await this once the
    /// job reaches a terminal state so the task doesn't outlive the job.
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}

impl ProgressSink for ProgressReporter {
    fn report(&self, done: u64, total: u64, message: &str) {
        let stage = *self.current_stage.lock().unwrap();
        let pct = progress_policy::translate(stage, done, total).max(Progress::ZERO);
        let message = ProgressMessage::new(message);

        let (start, end) = stage.band();
        let at_boundary = pct.value() == start || pct.value() == end;

        let mut last = self.last.lock().unwrap();
        let delta = pct.value().saturating_sub(last.pct.value());
        let message_changed = message.as_str() != last.message.as_str();
        if !at_boundary && delta <= ELIDE_DELTA && !message_changed {
            return;
        }
        let merged = last.pct.max(pct);
        last.pct = merged;
        last.message = message.clone();
        drop(last);

        let _ = self.tx.send(PersistCmd::Progress {
            stage,
            pct: merged,
            message,
        });
    }
}

impl CancellationSignal for ProgressReporter {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blogcast_domain::repositories::job_repository::SortOrder;
    use blogcast_domain::value_objects::{ClientIp, SourceUrl};
    use blogcast_domain::{JobError, JobRecord};
    use chrono::{DateTime, Utc};
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingRepo {
        patches: StdMutex<Vec<JobPatch>>,
    }

    #[async_trait]
    impl JobRepository for RecordingRepo {
        async fn create_job(&self, _url: SourceUrl, _client_ip: ClientIp, _expires_at: DateTime<Utc>) -> Result<JobRecord, JobError> {
            unimplemented!()
        }
        async fn get_job(&self, id: &JobId) -> Result<JobRecord, JobError> {
            Ok(JobRecord::new_pending(
                id.clone(),
                SourceUrl::new("https://example.com/a").unwrap(),
                ClientIp::new("1.2.3.4"),
                Utc::now(),
                Utc::now(),
                Utc::now(),
            ))
        }
        async fn update_job(&self, _id: &JobId, patch: JobPatch) -> Result<JobRecord, JobError> {
            self.patches.lock().unwrap().push(patch);
            self.get_job(_id).await
        }
        async fn delete_job(&self, _id: &JobId) -> Result<(), JobError> {
            unimplemented!()
        }
        async fn list_by_status(&self, _status: JobStatus, _limit: usize, _sort: SortOrder) -> Result<Vec<JobRecord>, JobError> {
            unimplemented!()
        }
        async fn count_recent_by_ip(&self, _ip: &ClientIp, _since: DateTime<Utc>) -> Result<u64, JobError> {
            unimplemented!()
        }
        async fn count_by_status(&self, _status: JobStatus) -> Result<u64, JobError> {
            unimplemented!()
        }
        async fn list_expired(&self, _now: DateTime<Utc>) -> Result<Vec<JobId>, JobError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn large_progress_jump_is_persisted() {
        let repo = Arc::new(RecordingRepo::default());
        let reporter = ProgressReporter::new(repo.clone(), JobId::new("job_1").unwrap());
        reporter.set_step(StageKind::Audio);
        reporter.report(5, 10, "halfway");
        tokio::task::yield_now().await;
        reporter.shutdown().await;
        assert!(!repo.patches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_identical_small_deltas_are_elided() {
        let repo = Arc::new(RecordingRepo::default());
        let reporter = ProgressReporter::new(repo.clone(), JobId::new("job_1").unwrap());
        reporter.set_step(StageKind::Audio);
        // First call always lands on the band start boundary and persists.
        reporter.report(0, 1000, "same");
        // A 1-point bump off the boundary with the same message is elided.
        reporter.report(29, 1000, "same");
        tokio::task::yield_now().await;
        reporter.shutdown().await;
        assert_eq!(repo.patches.lock().unwrap().len(), 1);
    }
}
