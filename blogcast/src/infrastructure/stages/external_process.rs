// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared subprocess plumbing for the four stage collaborators.
//!
//! Cancellation (§5) is cooperative only at the process boundary: a stage
//! cannot inspect or pause an external tool's internals, so the watcher
//! below kills the whole subprocess the moment [`CancellationSignal`]
//! trips rather than waiting for the tool to notice anything itself. This
//! is also the chosen behaviour for the video stage, which the design
//! notes call out as unable to honour cancellation mid-unit any other way.

use blogcast_domain::repositories::stage_executor::{CancellationSignal, ProgressSink, StageConfig};
use blogcast_domain::JobError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::interval;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(200);

fn default_language() -> String {
    "en".to_string()
}

#[derive(Deserialize)]
pub struct ExternalToolConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

impl ExternalToolConfig {
    pub fn from_stage_config(config: &StageConfig) -> Result<Self, JobError> {
        serde_json::from_value(config.0.clone())
            .map_err(|e| JobError::validation(format!("invalid stage configuration: {e}")))
    }
}

/// Runs `command args... <input_paths> <output_dir>` to completion,
/// killing it if `cancel` trips before it exits. Reports a coarse
/// start/finish pair on `progress` since the external tool does not speak
/// this contract's progress protocol.
pub async fn run_to_completion(
    tool: &ExternalToolConfig,
    input_paths: &[PathBuf],
    output_dir: &Path,
    progress: &dyn ProgressSink,
    cancel: &dyn CancellationSignal,
    stage_label: &str,
) -> Result<(), JobError> {
    progress.report(0, 1, &format!("{stage_label} starting"));

    tokio::fs::create_dir_all(output_dir).await?;

    let mut cmd = Command::new(&tool.command);
    cmd.args(&tool.args);
    for input in input_paths {
        cmd.arg(input);
    }
    cmd.arg(output_dir);

    let mut child = cmd
        .spawn()
        .map_err(|e| JobError::StageFailed(format!("{stage_label}: failed to spawn external tool: {e}")))?;

    let mut ticker = interval(CANCEL_POLL_INTERVAL);
    let status = loop {
        tokio::select! {
            result = child.wait() => {
                break result.map_err(|e| JobError::StageFailed(format!("{stage_label}: {e}")))?;
            }
            _ = ticker.tick() => {
                if cancel.is_cancelled() {
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    return Err(JobError::Cancelled(format!("{stage_label} cancelled")));
                }
            }
        }
    };

    if !status.success() {
        return Err(JobError::StageFailed(format!(
            "{stage_label} exited with status {status}"
        )));
    }

    progress.report(1, 1, &format!("{stage_label} finished"));
    Ok(())
}

/// Checks that every expected output exists and is non-empty (§4.5: a
/// stage that returns `Ok` but left an empty or missing artifact is still
/// a failure, the runner does not take the exit code alone as success).
pub async fn require_nonempty_outputs(paths: Vec<PathBuf>, stage_label: &str) -> Result<Vec<PathBuf>, JobError> {
    for path in &paths {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| JobError::StageFailed(format!("{stage_label}: missing output {}: {e}", path.display())))?;
        if meta.len() == 0 {
            return Err(JobError::StageFailed(format!(
                "{stage_label}: output {} is empty",
                path.display()
            )));
        }
    }
    Ok(paths)
}
