// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Process-wide `tracing` setup (§10 ambient stack). Level is driven by
//! `RUST_LOG`, defaulting to `info` so a deployment that sets nothing still
//! gets job lifecycle events without drowning in `debug` noise from
//! dependencies.

use blogcast_domain::JobEvent;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Call once from `main`; calling
/// it twice panics, which is what we want - it would mean two roles in the
/// same process both tried to own logging setup.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Emits a [`JobEvent`] as a structured record. The domain layer raises
/// these from every [`blogcast_domain::JobAggregate`] transition but stays
/// free of a logging dependency itself (§1) - this is the one place that
/// turns an event into a log line.
pub fn log_job_event(event: &JobEvent) {
    match event {
        JobEvent::Admitted { id, at } => {
            tracing::info!(job_id = %id, at = %at, "job admitted");
        }
        JobEvent::Claimed { id, at } => {
            tracing::info!(job_id = %id, at = %at, "job claimed by worker");
        }
        JobEvent::StageStarted { id, stage, at } => {
            tracing::info!(job_id = %id, stage = %stage, at = %at, "stage started");
        }
        JobEvent::ProgressReported { id, progress, message, at } => {
            tracing::debug!(job_id = %id, progress = progress.value(), message = message.as_str(), at = %at, "progress reported");
        }
        JobEvent::Completed { id, video_path, video_size, at } => {
            tracing::info!(job_id = %id, video_path = %video_path, video_size, at = %at, "job completed");
        }
        JobEvent::Failed { id, error_message, at } => {
            tracing::warn!(job_id = %id, error = %error_message, at = %at, "job failed");
        }
        JobEvent::Cancelled { id, at } => {
            tracing::info!(job_id = %id, at = %at, "job cancelled");
        }
    }
}
