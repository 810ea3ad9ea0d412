// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Slide-image stage (§4.5, band 55-80): renders one image per slide from
//! the script. HTML rendering and asset conversion are both out of scope
//! (§1); the slide count is determined by the external tool, not by this
//! stage, so the output set is discovered after the subprocess exits
//! rather than named up front.

use super::external_process::{require_nonempty_outputs, run_to_completion, ExternalToolConfig};
use async_trait::async_trait;
use blogcast_domain::repositories::stage_executor::{CancellationSignal, PipelineStage, ProgressSink, StageInvocation};
use blogcast_domain::value_objects::StageKind;
use blogcast_domain::JobError;
use std::path::PathBuf;

pub struct SlidesStage;

#[async_trait]
impl PipelineStage for SlidesStage {
    fn kind(&self) -> StageKind {
        StageKind::Slides
    }

    async fn run(
        &self,
        invocation: StageInvocation<'_>,
        progress: &dyn ProgressSink,
        cancel: &dyn CancellationSignal,
    ) -> Result<Vec<PathBuf>, JobError> {
        let tool = ExternalToolConfig::from_stage_config(invocation.config)?;
        run_to_completion(&tool, &invocation.input_paths, &invocation.output_dir, progress, cancel, "slides").await?;

        let mut slides = Vec::new();
        let mut entries = tokio::fs::read_dir(&invocation.output_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "png") {
                slides.push(path);
            }
        }
        slides.sort();
        if slides.is_empty() {
            return Err(JobError::StageFailed("slides: no .png artifacts produced".to_string()));
        }
        require_nonempty_outputs(slides, "slides").await
    }
}
