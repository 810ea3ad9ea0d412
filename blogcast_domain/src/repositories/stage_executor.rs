// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Invocation Contract
//!
//! The four pipeline stages (script, audio, slides, video - §4.5, §6.4) are
//! external collaborators whose *internals* are out of scope; what the
//! domain fixes is the shape of the call: inputs, an output directory, a
//! configuration handle, a progress callback, and a cancellation signal.
//!
//! Kept dependency-free of `tokio` on purpose - [`ProgressSink`] and
//! [`CancellationSignal`] are plain traits the infrastructure layer
//! implements over whatever async primitives it likes (a `tokio_util`
//! `CancellationToken`, an `AtomicBool`, and so on).

use crate::value_objects::StageKind;
use crate::JobError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Receives `(done, total, message)` updates from a running stage. The
/// runner is the implementation; it translates these into the job's global
/// percentage (§4.8).
pub trait ProgressSink: Send + Sync {
    fn report(&self, done: u64, total: u64, message: &str);
}

/// A no-op sink for stages that don't report incremental progress; the
/// runner still applies the stage's full band width on completion.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn report(&self, _done: u64, _total: u64, _message: &str) {}
}

/// Cooperative cancellation signal checked by stages between units of work
/// (§5). Not all stages can honour this mid-unit; the video stage in
/// particular is expected to kill its subprocess instead of polling this.
pub trait CancellationSignal: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// Opaque configuration handle passed through to a stage unexamined by the
/// core (§1: "configuration file schemas used *inside* pipeline stages...
/// are out of scope"). Concrete stages downcast or deserialize this
/// themselves.
pub struct StageConfig(pub serde_json::Value);

/// Everything one stage invocation needs.
pub struct StageInvocation<'a> {
    pub job_id: String,
    pub input_paths: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub config: &'a StageConfig,
}

/// One of the four pipeline stages, callable as `(inputs, output_dir,
/// config, progress_callback, cancel_token) -> artifacts` (§4.5).
///
/// A stage is successful iff it returns `Ok` and every artifact it claims
/// to have produced exists and is non-empty; the runner enforces the
/// empty-file check; implementations are only responsible for the paths.
#[async_trait]
pub trait PipelineStage: Send + Sync {
    fn kind(&self) -> StageKind;

    async fn run(
        &self,
        invocation: StageInvocation<'_>,
        progress: &dyn ProgressSink,
        cancel: &dyn CancellationSignal,
    ) -> Result<Vec<PathBuf>, JobError>;
}
