// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Runner (C5, §4.5)
//!
//! Drives the four stages in sequence inside a job's artifact directory,
//! rebasing each stage's progress onto its global band via
//! [`ProgressReporter`] and checking for cancellation at every stage
//! boundary. The runner itself never writes job status - it returns an
//! outcome and leaves persistence to its caller (the worker's
//! job-processing task, §4.6), matching the rule that a cancelled status
//! set by the HTTP endpoint is never overwritten by the runner.

use crate::application::progress_reporter::ProgressReporter;
use crate::infrastructure::logging::log_job_event;
use crate::infrastructure::metrics::STAGE_DURATION_SECONDS;
use blogcast_domain::repositories::stage_executor::{CancellationSignal, PipelineStage, ProgressSink, StageConfig, StageInvocation};
use blogcast_domain::value_objects::StageKind;
use blogcast_domain::{JobError, JobEvent, JobRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

pub enum PipelineOutcome {
    Completed { video_path: PathBuf, video_size: u64 },
    Cancelled,
}

pub struct PipelineRunner {
    stages: Vec<Arc<dyn PipelineStage>>,
    stage_configs: HashMap<StageKind, StageConfig>,
    data_root: PathBuf,
}

impl PipelineRunner {
    pub fn new(stages: Vec<Arc<dyn PipelineStage>>, stage_configs: HashMap<StageKind, StageConfig>, data_root: PathBuf) -> Self {
        Self {
            stages,
            stage_configs,
            data_root,
        }
    }

    fn job_dir(&self, job_id: &str) -> PathBuf {
        self.data_root.join("jobs").join(job_id)
    }

    fn stage_output_dir(job_dir: &Path, stage: StageKind) -> PathBuf {
        match stage {
            StageKind::Script => job_dir.join("script"),
            StageKind::Audio => job_dir.join("audio"),
            StageKind::Slides => job_dir.join("slides"),
            StageKind::Video => job_dir.to_path_buf(),
        }
    }

    /// Picks the inputs a given stage consumes, per the stage table in
    /// §4.5: audio and slides both read the script, video reads all three
    /// prior outputs.
    fn inputs_for(stage: StageKind, outputs: &HashMap<StageKind, Vec<PathBuf>>) -> Vec<PathBuf> {
        match stage {
            StageKind::Script => Vec::new(),
            StageKind::Audio | StageKind::Slides => outputs.get(&StageKind::Script).cloned().unwrap_or_default(),
            StageKind::Video => {
                let mut all = outputs.get(&StageKind::Script).cloned().unwrap_or_default();
                all.extend(outputs.get(&StageKind::Audio).cloned().unwrap_or_default());
                all.extend(outputs.get(&StageKind::Slides).cloned().unwrap_or_default());
                all
            }
        }
    }

    pub async fn run(&self, record: &JobRecord, reporter: &ProgressReporter) -> Result<PipelineOutcome, JobError> {
        let job_dir = self.job_dir(record.id.as_str());
        let mut script_input = vec![PathBuf::from(record.url.as_str())];
        let mut outputs: HashMap<StageKind, Vec<PathBuf>> = HashMap::new();

        for stage in &self.stages {
            let kind = stage.kind();

            if reporter.is_cancelled() {
                self.cleanup(&job_dir).await;
                return Ok(PipelineOutcome::Cancelled);
            }

            reporter.set_step(kind);
            log_job_event(&JobEvent::StageStarted {
                id: record.id.clone(),
                stage: kind,
                at: chrono::Utc::now(),
            });
            let config = self
                .stage_configs
                .get(&kind)
                .ok_or_else(|| JobError::internal(format!("no configuration registered for stage {kind}")))?;

            let input_paths = if kind == StageKind::Script {
                std::mem::take(&mut script_input)
            } else {
                Self::inputs_for(kind, &outputs)
            };

            let invocation = StageInvocation {
                job_id: record.id.as_str().to_string(),
                input_paths,
                output_dir: Self::stage_output_dir(&job_dir, kind),
                config,
            };

            let started = Instant::now();
            let result = stage.run(invocation, reporter as &dyn ProgressSink, reporter as &dyn CancellationSignal).await;

            match result {
                Ok(produced) => {
                    STAGE_DURATION_SECONDS
                        .with_label_values(&[kind.as_str(), "success"])
                        .observe(started.elapsed().as_secs_f64());
                    reporter.finalise(blogcast_domain::value_objects::ProgressMessage::new(format!("{kind} complete")));
                    outputs.insert(kind, produced);
                }
                Err(JobError::Cancelled(_)) => {
                    STAGE_DURATION_SECONDS
                        .with_label_values(&[kind.as_str(), "cancelled"])
                        .observe(started.elapsed().as_secs_f64());
                    self.cleanup(&job_dir).await;
                    return Ok(PipelineOutcome::Cancelled);
                }
                Err(e) => {
                    STAGE_DURATION_SECONDS
                        .with_label_values(&[kind.as_str(), "failure"])
                        .observe(started.elapsed().as_secs_f64());
                    return Err(e);
                }
            }
        }

        let video_outputs = outputs.remove(&StageKind::Video).unwrap_or_default();
        let video_path = video_outputs
            .into_iter()
            .next()
            .ok_or_else(|| JobError::internal("video stage produced no artifact"))?;
        let video_size = tokio::fs::metadata(&video_path).await.map(|m| m.len())?;

        // Stored and reported relative to `data_root` (§3, §6.5); the
        // absolute path is only meaningful to this process.
        let video_path = video_path.strip_prefix(&self.data_root).unwrap_or(&video_path).to_path_buf();

        Ok(PipelineOutcome::Completed { video_path, video_size })
    }

    async fn cleanup(&self, job_dir: &Path) {
        if let Err(e) = tokio::fs::remove_dir_all(job_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(dir = %job_dir.display(), error = %e, "best-effort artifact cleanup failed");
            }
        }
    }
}
