// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job Record
//!
//! The persisted representation of one submission (§3). A `JobRecord` has
//! identity (its [`JobId`]) and mutable state (status, progress, artifact
//! paths) that changes over its lifetime while the identity itself does not
//! - the defining trait of a DDD entity.
//!
//! This type is a plain data holder; the transition rules that keep it
//! honest live on [`crate::aggregates::JobAggregate`], which wraps a
//! `JobRecord` and is the only thing allowed to mutate one after creation.

use crate::value_objects::{ClientIp, JobId, JobStatus, Progress, ProgressMessage, SourceUrl, StageKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub url: SourceUrl,
    pub status: JobStatus,
    pub progress: Progress,
    pub progress_message: ProgressMessage,
    pub current_step: Option<StageKind>,
    pub video_path: Option<String>,
    pub video_size: Option<u64>,
    pub error_message: Option<String>,
    pub client_ip: ClientIp,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl JobRecord {
    /// Builds the domain view of a freshly admitted record in the `pending`
    /// state. The id and the `created`/`updated` timestamps belong to the
    /// record store and are supplied by it after the create call returns
    /// (§4.1); this constructor assembles that response, it does not mint a
    /// new job.
    #[allow(clippy::too_many_arguments)]
    pub fn new_pending(
        id: JobId,
        url: SourceUrl,
        client_ip: ClientIp,
        expires_at: DateTime<Utc>,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            url,
            status: JobStatus::Pending,
            progress: Progress::ZERO,
            progress_message: ProgressMessage::default(),
            current_step: None,
            video_path: None,
            video_size: None,
            error_message: None,
            client_ip,
            started_at: None,
            completed_at: None,
            expires_at,
            created,
            updated,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
