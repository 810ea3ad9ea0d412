// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Narration audio stage (§4.5, band 20-55): synthesizes speech from the
//! script. Text-to-speech internals are out of scope (§1).

use super::external_process::{require_nonempty_outputs, run_to_completion, ExternalToolConfig};
use async_trait::async_trait;
use blogcast_domain::repositories::stage_executor::{CancellationSignal, PipelineStage, ProgressSink, StageInvocation};
use blogcast_domain::value_objects::StageKind;
use blogcast_domain::JobError;
use std::path::PathBuf;

pub struct AudioStage;

#[async_trait]
impl PipelineStage for AudioStage {
    fn kind(&self) -> StageKind {
        StageKind::Audio
    }

    async fn run(
        &self,
        invocation: StageInvocation<'_>,
        progress: &dyn ProgressSink,
        cancel: &dyn CancellationSignal,
    ) -> Result<Vec<PathBuf>, JobError> {
        let tool = ExternalToolConfig::from_stage_config(invocation.config)?;
        run_to_completion(&tool, &invocation.input_paths, &invocation.output_dir, progress, cancel, "audio").await?;

        let mut phrases = Vec::new();
        let mut entries = tokio::fs::read_dir(&invocation.output_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "wav") {
                phrases.push(path);
            }
        }
        phrases.sort();
        if phrases.is_empty() {
            return Err(JobError::StageFailed("audio: no .wav artifacts produced".to_string()));
        }
        require_nonempty_outputs(phrases, "audio").await
    }
}
