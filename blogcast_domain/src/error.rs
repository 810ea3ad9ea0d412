// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! Hierarchical error type for the job orchestration domain. Mirrors the
//! taxonomy in the design notes: admission refusals, record-store failures,
//! stage failures, and filesystem failures are distinguished so that callers
//! at the edges (HTTP handlers, the worker loop) can map them precisely.

use thiserror::Error;

/// Domain-specific errors for the job orchestration system.
#[derive(Error, Debug, Clone)]
pub enum JobError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("record store auth failure: {0}")]
    AuthFailure(String),

    #[error("record store conflict: {0}")]
    Conflict(String),

    #[error("record store transport error: {0}")]
    Transport(String),

    #[error("record store server error: {0}")]
    ServerError(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("queue full: {0}")]
    QueueFull(String),

    #[error("content quality too low: {0}")]
    QualityTooLow(String),

    #[error("content quality probe unavailable: {0}")]
    ProbeUnavailable(String),

    #[error("stage failed: {0}")]
    StageFailed(String),

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("io error: {0}")]
    IoError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl JobError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Admission refusals carry a stable reason string that the HTTP layer
    /// surfaces to the caller; everything else is collapsed to a generic
    /// 500 there.
    pub fn is_admission_refusal(&self) -> bool {
        matches!(
            self,
            JobError::RateLimited(_)
                | JobError::QueueFull(_)
                | JobError::QualityTooLow(_)
                | JobError::ProbeUnavailable(_)
        )
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, JobError::Transport(_) | JobError::ServerError(_))
    }
}

impl From<std::io::Error> for JobError {
    fn from(err: std::io::Error) -> Self {
        JobError::IoError(err.to_string())
    }
}
