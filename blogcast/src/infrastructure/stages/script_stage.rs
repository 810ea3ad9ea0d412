// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Script-generation stage (§4.5, band 0-20): turns the fetched blog text
//! into a narration script. The text generation itself is out of scope
//! (§1); this wraps whatever external tool does it.

use super::external_process::{require_nonempty_outputs, run_to_completion, ExternalToolConfig};
use async_trait::async_trait;
use blogcast_domain::repositories::stage_executor::{CancellationSignal, PipelineStage, ProgressSink, StageInvocation};
use blogcast_domain::value_objects::StageKind;
use blogcast_domain::JobError;
use std::path::PathBuf;

pub struct ScriptStage;

#[async_trait]
impl PipelineStage for ScriptStage {
    fn kind(&self) -> StageKind {
        StageKind::Script
    }

    async fn run(
        &self,
        invocation: StageInvocation<'_>,
        progress: &dyn ProgressSink,
        cancel: &dyn CancellationSignal,
    ) -> Result<Vec<PathBuf>, JobError> {
        let tool = ExternalToolConfig::from_stage_config(invocation.config)?;
        run_to_completion(&tool, &invocation.input_paths, &invocation.output_dir, progress, cancel, "script").await?;
        require_nonempty_outputs(vec![invocation.output_dir.join("script.yaml")], "script").await
    }
}
