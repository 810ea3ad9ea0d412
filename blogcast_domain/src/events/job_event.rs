// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Events
//!
//! Events raised by [`crate::aggregates::JobAggregate`] as a job moves
//! through its lifecycle. These are informational (used for structured
//! logging and, eventually, metrics) rather than the system of record - the
//! record store's `status` field remains authoritative (§5).

use crate::value_objects::{JobId, Progress, ProgressMessage, StageKind};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum JobEvent {
    Admitted {
        id: JobId,
        at: DateTime<Utc>,
    },
    Claimed {
        id: JobId,
        at: DateTime<Utc>,
    },
    StageStarted {
        id: JobId,
        stage: StageKind,
        at: DateTime<Utc>,
    },
    ProgressReported {
        id: JobId,
        progress: Progress,
        message: ProgressMessage,
        at: DateTime<Utc>,
    },
    Completed {
        id: JobId,
        video_path: String,
        video_size: u64,
        at: DateTime<Utc>,
    },
    Failed {
        id: JobId,
        error_message: String,
        at: DateTime<Utc>,
    },
    Cancelled {
        id: JobId,
        at: DateTime<Utc>,
    },
}

impl JobEvent {
    pub fn job_id(&self) -> &JobId {
        match self {
            JobEvent::Admitted { id, .. }
            | JobEvent::Claimed { id, .. }
            | JobEvent::StageStarted { id, .. }
            | JobEvent::ProgressReported { id, .. }
            | JobEvent::Completed { id, .. }
            | JobEvent::Failed { id, .. }
            | JobEvent::Cancelled { id, .. } => id,
        }
    }
}
