// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Process Configuration (C9)
//!
//! Loads the process-wide settings table (§4.9) from, in increasing
//! priority: built-in defaults, an optional TOML/YAML file, then
//! `BLOGCAST_*` environment variables, then CLI flags applied by the
//! composition root after load. Layered with the `config` crate the way
//! the teacher's infrastructure layer loads pipeline settings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing required setting: {0}")]
    MissingRequired(&'static str),
}

/// Process-wide settings (§4.9). Every field has a documented default
/// except the three marked `required`, which fail fast at startup rather
/// than admitting jobs the service can't actually process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_root: String,
    pub record_store_url: String,
    pub record_store_admin_email: String,
    pub record_store_admin_password: String,
    pub max_queue_size: u32,
    pub rate_limit_per_day: u32,
    pub max_concurrent_jobs: usize,
    pub poll_interval_seconds: u64,
    pub job_expiry_hours: u64,
    pub quality_probe_min_chars: usize,
    pub quality_probe_timeout_seconds: u64,
    pub expiry_reap_interval_seconds: u64,
    pub bind_addr: String,
    pub quality_probe_url: String,
    pub script_stage_command: String,
    pub audio_stage_command: String,
    pub slides_stage_command: String,
    pub video_stage_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: "/app/data".to_string(),
            record_store_url: String::new(),
            record_store_admin_email: String::new(),
            record_store_admin_password: String::new(),
            max_queue_size: 10,
            rate_limit_per_day: 5,
            max_concurrent_jobs: 2,
            poll_interval_seconds: 5,
            job_expiry_hours: 24,
            quality_probe_min_chars: 200,
            quality_probe_timeout_seconds: 30,
            expiry_reap_interval_seconds: 3600,
            bind_addr: "0.0.0.0:8080".to_string(),
            quality_probe_url: String::new(),
            script_stage_command: "blogcast-script-stage".to_string(),
            audio_stage_command: "blogcast-audio-stage".to_string(),
            slides_stage_command: "blogcast-slides-stage".to_string(),
            video_stage_command: "blogcast-video-stage".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from an optional file plus `BLOGCAST_*` environment
    /// overrides, layered on top of [`Settings::default`].
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let mut builder = config::Config::builder()
            .set_default("data_root", defaults.data_root.clone())?
            .set_default("record_store_url", defaults.record_store_url.clone())?
            .set_default("record_store_admin_email", defaults.record_store_admin_email.clone())?
            .set_default(
                "record_store_admin_password",
                defaults.record_store_admin_password.clone(),
            )?
            .set_default("max_queue_size", defaults.max_queue_size as i64)?
            .set_default("rate_limit_per_day", defaults.rate_limit_per_day as i64)?
            .set_default("max_concurrent_jobs", defaults.max_concurrent_jobs as i64)?
            .set_default("poll_interval_seconds", defaults.poll_interval_seconds as i64)?
            .set_default("job_expiry_hours", defaults.job_expiry_hours as i64)?
            .set_default("quality_probe_min_chars", defaults.quality_probe_min_chars as i64)?
            .set_default(
                "quality_probe_timeout_seconds",
                defaults.quality_probe_timeout_seconds as i64,
            )?
            .set_default(
                "expiry_reap_interval_seconds",
                defaults.expiry_reap_interval_seconds as i64,
            )?
            .set_default("bind_addr", defaults.bind_addr.clone())?
            .set_default("quality_probe_url", defaults.quality_probe_url.clone())?
            .set_default("script_stage_command", defaults.script_stage_command.clone())?
            .set_default("audio_stage_command", defaults.audio_stage_command.clone())?
            .set_default("slides_stage_command", defaults.slides_stage_command.clone())?
            .set_default("video_stage_command", defaults.video_stage_command.clone())?;

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder = builder.add_source(config::Environment::with_prefix("BLOGCAST").separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.record_store_url.is_empty() {
            return Err(ConfigError::MissingRequired("record_store_url"));
        }
        if self.record_store_admin_email.is_empty() {
            return Err(ConfigError::MissingRequired("record_store_admin_email"));
        }
        if self.record_store_admin_password.is_empty() {
            return Err(ConfigError::MissingRequired("record_store_admin_password"));
        }
        if self.quality_probe_url.is_empty() {
            return Err(ConfigError::MissingRequired("quality_probe_url"));
        }
        Ok(())
    }
}

/// Wall-clock and monotonic time abstraction (§4.9), so tests can control
/// elapsed-time-dependent behavior (rate-limit windows, expiry, reaper
/// cadence) without sleeping.
pub trait TimeSource: Send + Sync {
    fn now_utc(&self) -> chrono::DateTime<chrono::Utc>;
    fn monotonic_now(&self) -> std::time::Instant;
}

/// Production time source backed by the OS clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_utc(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }

    fn monotonic_now(&self) -> std::time::Instant {
        std::time::Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_table() {
        let defaults = Settings::default();
        assert_eq!(defaults.max_queue_size, 10);
        assert_eq!(defaults.rate_limit_per_day, 5);
        assert_eq!(defaults.max_concurrent_jobs, 2);
        assert_eq!(defaults.poll_interval_seconds, 5);
        assert_eq!(defaults.job_expiry_hours, 24);
        assert_eq!(defaults.quality_probe_min_chars, 200);
        assert_eq!(defaults.quality_probe_timeout_seconds, 30);
        assert_eq!(defaults.expiry_reap_interval_seconds, 3600);
    }

    #[test]
    fn load_fails_fast_without_required_record_store_url() {
        // No file, no env vars set for this process: record_store_url
        // stays empty and validation must reject it.
        std::env::remove_var("BLOGCAST__RECORD_STORE_URL");
        let result = Settings::load(None);
        assert!(matches!(result, Err(ConfigError::MissingRequired("record_store_url"))));
    }

    #[test]
    fn system_time_source_produces_monotonic_instants() {
        let source = SystemTimeSource;
        let a = source.monotonic_now();
        let b = source.monotonic_now();
        assert!(b >= a);
    }
}
