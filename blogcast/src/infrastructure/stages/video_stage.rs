// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Video muxing stage (§4.5, band 80-100): combines the narration audio
//! and slide images into the final video. Media transcoding internals are
//! out of scope and explicitly a non-goal for this crate (§1) - this
//! stage only invokes the external muxer and validates its output.
//!
//! This is the stage the design notes flag as unable to honour cooperative
//! cancellation mid-unit: a single muxing pass is not divisible into
//! progress-reportable units, so [`run_to_completion`] killing the
//! subprocess outright is this stage's entire cancellation story, not a
//! fallback.

use super::external_process::{require_nonempty_outputs, run_to_completion, ExternalToolConfig};
use async_trait::async_trait;
use blogcast_domain::repositories::stage_executor::{CancellationSignal, PipelineStage, ProgressSink, StageInvocation};
use blogcast_domain::value_objects::StageKind;
use blogcast_domain::JobError;
use std::path::PathBuf;

pub struct VideoStage;

#[async_trait]
impl PipelineStage for VideoStage {
    fn kind(&self) -> StageKind {
        StageKind::Video
    }

    async fn run(
        &self,
        invocation: StageInvocation<'_>,
        progress: &dyn ProgressSink,
        cancel: &dyn CancellationSignal,
    ) -> Result<Vec<PathBuf>, JobError> {
        let tool = ExternalToolConfig::from_stage_config(invocation.config)?;
        run_to_completion(&tool, &invocation.input_paths, &invocation.output_dir, progress, cancel, "video").await?;
        let output_path = invocation.output_dir.join(format!("output_{}.mp4", tool.language));
        require_nonempty_outputs(vec![output_path], "video").await
    }
}
