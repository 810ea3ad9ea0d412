// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job Repository Interface
//!
//! Defines the contract for job persistence (§4.1, C1) without committing
//! the domain to any particular storage technology. The concrete
//! implementation is a thin HTTP client over an external record-store
//! service (the infrastructure layer); this trait is what the rest of the
//! domain and application layers are written against, so an in-memory
//! fake is a drop-in replacement in tests.
//!
//! ## Error Mapping
//!
//! Implementations translate their transport's failure modes onto
//! [`JobError`]'s `NotFound` / `AuthFailure` / `Conflict` / `Transport` /
//! `ServerError` variants. Callers decide propagation per §7: HTTP handlers
//! map these to status codes, the worker loop logs and retries at the next
//! poll.

use crate::entities::JobRecord;
use crate::value_objects::{ClientIp, JobId, JobStatus, SourceUrl};
use crate::JobError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Fields that may be patched on an existing record. `None` means "leave
/// unchanged" for optional updates; status/progress changes always go
/// through here rather than a bespoke method per field so that a single
/// HTTP PATCH round-trip to the record store suffices.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub progress_message: Option<String>,
    pub current_step: Option<Option<String>>,
    pub video_path: Option<String>,
    pub video_size: Option<u64>,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobPatch {
    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn progress_message(mut self, message: impl Into<String>) -> Self {
        self.progress_message = Some(message.into());
        self
    }

    pub fn current_step(mut self, step: Option<String>) -> Self {
        self.current_step = Some(step);
        self
    }

    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = Some(at);
        self
    }

    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
    }

    pub fn video(mut self, path: impl Into<String>, size: u64) -> Self {
        self.video_path = Some(path.into());
        self.video_size = Some(size);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// Sort order for `list_by_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    OldestFirst,
    NewestFirst,
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Creates a record in `pending` status. The store assigns the id;
    /// the returned record is the store's full view of it.
    async fn create_job(
        &self,
        url: SourceUrl,
        client_ip: ClientIp,
        expires_at: DateTime<Utc>,
    ) -> Result<JobRecord, JobError>;

    async fn get_job(&self, id: &JobId) -> Result<JobRecord, JobError>;

    async fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<JobRecord, JobError>;

    async fn delete_job(&self, id: &JobId) -> Result<(), JobError>;

    async fn list_by_status(
        &self,
        status: JobStatus,
        limit: usize,
        sort: SortOrder,
    ) -> Result<Vec<JobRecord>, JobError>;

    /// Count of submissions from `ip` since `since`, across all statuses
    /// (S2: cancelled and failed jobs still count against the quota).
    async fn count_recent_by_ip(&self, ip: &ClientIp, since: DateTime<Utc>) -> Result<u64, JobError>;

    async fn count_by_status(&self, status: JobStatus) -> Result<u64, JobError>;

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<JobId>, JobError>;
}
