// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus metrics exposed at `/metrics` (§10.5). Counters track
//! admission decisions and terminal job outcomes; a histogram tracks how
//! long each pipeline stage takes, since that is the number an operator
//! needs to size `max_concurrent_jobs` against `poll_interval_seconds`.

use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramVec, IntCounterVec, IntGauge, Registry, TextEncoder};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static JOBS_COMPLETED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        prometheus::Opts::new("blogcast_jobs_completed_total", "Jobs reaching a terminal status"),
        &["status"],
    )
    .expect("metric registration with a fixed name cannot collide on first call");
    REGISTRY.register(Box::new(counter.clone())).expect("register jobs_completed_total");
    counter
});

pub static ADMISSION_REFUSALS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        prometheus::Opts::new("blogcast_admission_refusals_total", "Submissions refused before a job was created"),
        &["reason"],
    )
    .expect("metric registration with a fixed name cannot collide on first call");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("register admission_refusals_total");
    counter
});

pub static STAGE_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        prometheus::HistogramOpts::new("blogcast_stage_duration_seconds", "Wall-clock duration of one stage invocation"),
        &["stage", "outcome"],
    )
    .expect("metric registration with a fixed name cannot collide on first call");
    REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("register stage_duration_seconds");
    histogram
});

pub static WORKER_CONCURRENCY: Lazy<IntGauge> = Lazy::new(|| {
    let gauge = IntGauge::new("blogcast_worker_concurrency", "Jobs currently claimed and processing")
        .expect("metric registration with a fixed name cannot collide on first call");
    REGISTRY.register(Box::new(gauge.clone())).expect("register worker_concurrency");
    gauge
});

/// Forces registration of every metric above so the first `/metrics` scrape
/// isn't missing series that haven't been touched yet.
pub fn init() {
    Lazy::force(&JOBS_COMPLETED_TOTAL);
    Lazy::force(&ADMISSION_REFUSALS_TOTAL);
    Lazy::force(&STAGE_DURATION_SECONDS);
    Lazy::force(&WORKER_CONCURRENCY);
}

/// Renders the registry in Prometheus text exposition format.
pub fn render() -> Result<String, prometheus::Error> {
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_metric_names() {
        init();
        JOBS_COMPLETED_TOTAL.with_label_values(&["completed"]).inc();
        let rendered = render().unwrap();
        assert!(rendered.contains("blogcast_jobs_completed_total"));
    }
}
