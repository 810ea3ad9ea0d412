// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job Aggregate
//!
//! `JobAggregate` wraps a [`JobRecord`] and is the sole owner of its state
//! transitions. It enforces the invariants from §3:
//!
//! - `status` only moves along edges of the DAG in [`JobStatus::can_transition_to`].
//! - `progress` is monotonically non-decreasing while `processing`.
//! - `video_path` is set iff the terminal state is `completed`.
//! - `error_message` is set iff the terminal state is `failed`.
//! - `started_at` / `completed_at` are each set exactly once.
//!
//! Every mutating method returns the [`JobEvent`] it raised (or an error if
//! the transition is illegal) rather than mutating the caller's view of
//! uncommitted events as a side channel; the worker loop and pipeline runner
//! log these events, they are not replayed to reconstruct state.

use crate::entities::JobRecord;
use crate::events::JobEvent;
use crate::value_objects::{JobStatus, Progress, ProgressMessage, StageKind};
use crate::JobError;
use chrono::{DateTime, Utc};

pub struct JobAggregate {
    record: JobRecord,
}

impl JobAggregate {
    pub fn new(record: JobRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &JobRecord {
        &self.record
    }

    pub fn into_record(self) -> JobRecord {
        self.record
    }

    /// `pending -> processing`. Sets `started_at` exactly once.
    pub fn claim(&mut self, now: DateTime<Utc>) -> Result<JobEvent, JobError> {
        self.transition(JobStatus::Processing)?;
        self.record.started_at = Some(now);
        self.record.progress = Progress::ZERO;
        self.record.current_step = None;
        self.record.updated = now;
        Ok(JobEvent::Claimed {
            id: self.record.id.clone(),
            at: now,
        })
    }

    /// Records a progress update while `processing`. Enforces monotonicity
    /// by taking `max(current, reported)` rather than rejecting a lower
    /// value outright - the progress reporter already rebases per-stage
    /// callbacks onto a global band, so a lower raw value here would be a
    /// reporter bug, not grounds to fail the job.
    pub fn report_progress(
        &mut self,
        stage: StageKind,
        progress: Progress,
        message: ProgressMessage,
        now: DateTime<Utc>,
    ) -> Result<JobEvent, JobError> {
        if self.record.status != JobStatus::Processing {
            return Err(JobError::invalid_transition(format!(
                "cannot report progress on a job in status {}",
                self.record.status
            )));
        }
        self.record.progress = self.record.progress.max(progress);
        self.record.progress_message = message.clone();
        self.record.current_step = Some(stage);
        self.record.updated = now;
        Ok(JobEvent::ProgressReported {
            id: self.record.id.clone(),
            progress: self.record.progress,
            message,
            at: now,
        })
    }

    /// `processing -> completed`. Sets `completed_at` exactly once and
    /// forces `progress` to 100.
    pub fn complete(
        &mut self,
        video_path: String,
        video_size: u64,
        now: DateTime<Utc>,
    ) -> Result<JobEvent, JobError> {
        self.transition(JobStatus::Completed)?;
        self.record.progress = Progress::COMPLETE;
        self.record.video_path = Some(video_path.clone());
        self.record.video_size = Some(video_size);
        self.record.completed_at = Some(now);
        self.record.updated = now;
        Ok(JobEvent::Completed {
            id: self.record.id.clone(),
            video_path,
            video_size,
            at: now,
        })
    }

    /// `processing -> failed`. `progress` is preserved at its last value
    /// per §3.
    pub fn fail(&mut self, error_message: String, now: DateTime<Utc>) -> Result<JobEvent, JobError> {
        self.transition(JobStatus::Failed)?;
        self.record.error_message = Some(error_message.clone());
        self.record.completed_at = Some(now);
        self.record.updated = now;
        Ok(JobEvent::Failed {
            id: self.record.id.clone(),
            error_message,
            at: now,
        })
    }

    /// `{pending, processing} -> cancelled`. Used by the HTTP cancel
    /// endpoint; the worker never calls this, it only observes the
    /// resulting status (§5).
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<JobEvent, JobError> {
        self.transition(JobStatus::Cancelled)?;
        self.record.completed_at = Some(now);
        self.record.updated = now;
        Ok(JobEvent::Cancelled {
            id: self.record.id.clone(),
            at: now,
        })
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), JobError> {
        if !self.record.status.can_transition_to(next) {
            return Err(JobError::invalid_transition(format!(
                "{} -> {} is not a legal job state transition",
                self.record.status, next
            )));
        }
        self.record.status = next;
        Ok(())
    }

    /// Cross-checks the invariants from §3 that span multiple fields; used
    /// by tests and by the recovery path after reading a record back from
    /// the store.
    pub fn validate(&self) -> Result<(), JobError> {
        let r = &self.record;
        if r.status == JobStatus::Completed {
            if r.video_path.is_none() {
                return Err(JobError::internal("completed job missing video_path"));
            }
            if r.progress != Progress::COMPLETE {
                return Err(JobError::internal("completed job progress is not 100"));
            }
        }
        if r.status == JobStatus::Failed && r.error_message.is_none() {
            return Err(JobError::internal("failed job missing error_message"));
        }
        if r.expires_at <= r.created {
            return Err(JobError::internal("expires_at must be after created"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{ClientIp, JobId, SourceUrl};
    use chrono::Duration;

    fn fresh(now: DateTime<Utc>) -> JobAggregate {
        let record = JobRecord::new_pending(
            JobId::new("job_1").unwrap(),
            SourceUrl::new("https://example.com/a").unwrap(),
            ClientIp::new("10.0.0.1"),
            now + Duration::hours(24),
            now,
            now,
        );
        JobAggregate::new(record)
    }

    #[test]
    fn full_happy_path_transitions() {
        let now = Utc::now();
        let mut agg = fresh(now);
        agg.claim(now).unwrap();
        agg.report_progress(StageKind::Script, Progress::new(20).unwrap(), ProgressMessage::new("script done"), now)
            .unwrap();
        agg.report_progress(StageKind::Audio, Progress::new(55).unwrap(), ProgressMessage::new("audio done"), now)
            .unwrap();
        agg.complete("jobs/job_1/output_ja.mp4".into(), 12345, now).unwrap();
        assert_eq!(agg.record().status, JobStatus::Completed);
        assert_eq!(agg.record().progress, Progress::COMPLETE);
        assert!(agg.validate().is_ok());
    }

    #[test]
    fn progress_never_dips_across_stage_boundary() {
        let now = Utc::now();
        let mut agg = fresh(now);
        agg.claim(now).unwrap();
        agg.report_progress(StageKind::Script, Progress::new(20).unwrap(), ProgressMessage::default(), now)
            .unwrap();
        // Stage 2's first callback rebases to (0, total) locally, but the
        // translated global value must still be >= 20.
        agg.report_progress(StageKind::Audio, Progress::new(20).unwrap(), ProgressMessage::default(), now)
            .unwrap();
        assert_eq!(agg.record().progress.value(), 20);
    }

    #[test]
    fn cannot_complete_a_pending_job() {
        let now = Utc::now();
        let mut agg = fresh(now);
        assert!(agg.complete("x".into(), 1, now).is_err());
    }

    #[test]
    fn terminal_jobs_reject_further_progress() {
        let now = Utc::now();
        let mut agg = fresh(now);
        agg.claim(now).unwrap();
        agg.fail("boom".into(), now).unwrap();
        assert!(agg
            .report_progress(StageKind::Audio, Progress::new(50).unwrap(), ProgressMessage::default(), now)
            .is_err());
    }

    #[test]
    fn cancel_from_pending_sets_completed_at_without_touching_progress() {
        let now = Utc::now();
        let mut agg = fresh(now);
        agg.cancel(now).unwrap();
        assert_eq!(agg.record().status, JobStatus::Cancelled);
        assert_eq!(agg.record().progress, Progress::ZERO);
        assert!(agg.record().completed_at.is_some());
    }
}
