// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Composition Root
//!
//! Parses CLI flags, loads settings, wires the C1-C9 collaborators
//! together, and runs the API server and/or worker loop depending on
//! `--role` (§2, §6.6). A `--role both` process runs the HTTP server and
//! the worker loop on the same tokio runtime, sharing one record-store
//! client.

use anyhow::Context;
use blogcast::application::{AdmissionController, ExpiryReaper, PipelineRunner, WorkerLoop};
use blogcast::infrastructure::stages::{AudioStage, ScriptStage, SlidesStage, VideoStage};
use blogcast::infrastructure::{logging, metrics, HttpQualityProbeClient, RecordStoreClient};
use blogcast::presentation::{self, AppState};
use blogcast_bootstrap::logger::{BootstrapLogger, ConsoleLogger};
use blogcast_bootstrap::platform::create_platform;
use blogcast_bootstrap::shutdown::ShutdownCoordinator;
use blogcast_bootstrap::{bootstrap_cli, result_to_exit_code, signals, Role, Settings, SystemTimeSource};
use blogcast_domain::repositories::job_repository::JobRepository;
use blogcast_domain::repositories::stage_executor::{PipelineStage, StageConfig};
use blogcast_domain::value_objects::StageKind;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

fn stage_config(command: &str) -> StageConfig {
    StageConfig(serde_json::json!({ "command": command, "args": [], "language": "en" }))
}

async fn run(cli: blogcast_bootstrap::ValidatedCli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    let data_root = cli.data_root.unwrap_or_else(|| PathBuf::from(&settings.data_root));
    let max_concurrent_jobs = cli.concurrency.unwrap_or(settings.max_concurrent_jobs);
    let bind_addr = cli.bind_addr.unwrap_or_else(|| settings.bind_addr.clone());

    metrics::init();

    let time = Arc::new(SystemTimeSource);
    let repository: Arc<dyn JobRepository> = Arc::new(RecordStoreClient::new(
        settings.record_store_url.clone(),
        settings.record_store_admin_email.clone(),
        settings.record_store_admin_password.clone(),
    ));
    let probe = Arc::new(HttpQualityProbeClient::new(
        settings.quality_probe_url.clone(),
        settings.quality_probe_min_chars,
        Duration::from_secs(settings.quality_probe_timeout_seconds),
    ));
    let admission = Arc::new(AdmissionController::new(
        repository.clone(),
        probe,
        time.clone(),
        settings.max_queue_size,
        settings.rate_limit_per_day,
        settings.job_expiry_hours,
    ));

    let coordinator = Arc::new(ShutdownCoordinator::default());

    let mut handles = Vec::new();

    if matches!(cli.role, Role::Api | Role::Both) {
        let state = AppState::new(repository.clone(), admission.clone(), time.clone(), data_root.clone());
        let router = presentation::router(state);
        let addr: SocketAddr = bind_addr.parse().with_context(|| format!("invalid bind address {bind_addr}"))?;
        let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!(%addr, "api listening");

        let shutdown = coordinator.token();
        handles.push(tokio::spawn(async move {
            let server = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>());
            let graceful = server.with_graceful_shutdown(async move { shutdown.cancelled().await });
            if let Err(e) = graceful.await {
                tracing::error!(error = %e, "api server exited with error");
            }
        }));
    }

    if matches!(cli.role, Role::Worker | Role::Both) {
        let stages: Vec<Arc<dyn PipelineStage>> = vec![
            Arc::new(ScriptStage),
            Arc::new(AudioStage),
            Arc::new(SlidesStage),
            Arc::new(VideoStage),
        ];
        let mut stage_configs = HashMap::new();
        stage_configs.insert(StageKind::Script, stage_config(&settings.script_stage_command));
        stage_configs.insert(StageKind::Audio, stage_config(&settings.audio_stage_command));
        stage_configs.insert(StageKind::Slides, stage_config(&settings.slides_stage_command));
        stage_configs.insert(StageKind::Video, stage_config(&settings.video_stage_command));

        let runner = Arc::new(PipelineRunner::new(stages, stage_configs, data_root.clone()));
        let reaper = Arc::new(ExpiryReaper::new(
            repository.clone(),
            time.clone(),
            data_root.clone(),
            Duration::from_secs(settings.expiry_reap_interval_seconds),
        ));
        let worker = Arc::new(WorkerLoop::new(
            repository.clone(),
            runner,
            reaper,
            time.clone(),
            Duration::from_secs(settings.poll_interval_seconds),
            max_concurrent_jobs,
        ));

        let shutdown = coordinator.token();
        handles.push(tokio::spawn(async move { worker.run(shutdown).await }));
    }

    let signal_coordinator = coordinator.clone();
    tokio::spawn(async move { signals::wait_for_shutdown_signal(signal_coordinator).await });

    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}

fn main() -> ExitCode {
    let startup_logger = ConsoleLogger::new();

    let cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            startup_logger.error(&format!("argument error: {e}"));
            return blogcast_bootstrap::map_error_to_exit_code(&e).into();
        }
    };

    startup_logger.info("starting blogcast");

    logging::init(cli.verbose);

    let platform = create_platform();
    tracing::info!(
        platform = platform.platform_name(),
        cpu_count = platform.cpu_count(),
        "platform detected"
    );

    let runtime = tokio::runtime::Runtime::new().expect("failed to build tokio runtime");
    let result = runtime.block_on(run(cli));
    result_to_exit_code(result)
}
