// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Content Quality Probe Interface
//!
//! Domain-facing contract for C2 (§4.2): fetch a short summary of a
//! candidate URL from an external summary service and judge whether it is
//! substantial enough to be worth a pipeline run. The acceptance rule
//! itself - trimmed length against [`QUALITY_PROBE_MIN_CHARS`] - lives here
//! since it is a business rule, not a transport detail; the transport
//! (HTTP call, timeout, credential handling) is the infrastructure
//! implementation's concern.

use crate::JobError;
use async_trait::async_trait;

/// Default minimum trimmed-summary length for admission (§4.9); the
/// configured value always wins, this is only the fallback when configuration
/// is silent.
pub const QUALITY_PROBE_MIN_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub accepted: bool,
    pub reason: String,
}

impl ProbeOutcome {
    pub fn accept() -> Self {
        Self {
            accepted: true,
            reason: "summary meets minimum length".to_string(),
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: reason.into(),
        }
    }
}

/// Applies the acceptance rule to an already-fetched summary: trim
/// whitespace, count characters, compare against `min_chars`. Kept as a
/// free function so both the live probe and any test double apply
/// identical rules.
pub fn judge_summary(summary: &str, min_chars: usize) -> ProbeOutcome {
    let trimmed = summary.trim();
    if trimmed.is_empty() {
        return ProbeOutcome::reject("summary was empty");
    }
    let len = trimmed.chars().count();
    if len < min_chars {
        ProbeOutcome::reject(format!(
            "summary too short ({len} chars, need at least {min_chars})"
        ))
    } else {
        ProbeOutcome::accept()
    }
}

/// External content-quality probe (C2). Any failure - missing credentials,
/// network failure, timeout, non-2xx, malformed response - must surface as
/// `Err`, never as a silent acceptance; the caller (`AdmissionController`)
/// treats an `Err` the same as an explicit rejection.
#[async_trait]
pub trait QualityProbeService: Send + Sync {
    async fn probe(&self, url: &str) -> Result<ProbeOutcome, JobError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_boundary_length_is_accepted() {
        let summary = "a".repeat(200);
        assert!(judge_summary(&summary, 200).accepted);
    }

    #[test]
    fn one_under_boundary_is_rejected() {
        let summary = "a".repeat(199);
        assert!(!judge_summary(&summary, 200).accepted);
    }

    #[test]
    fn whitespace_is_trimmed_before_counting() {
        let summary = format!("  {}  ", "a".repeat(200));
        assert!(judge_summary(&summary, 200).accepted);
    }

    #[test]
    fn empty_summary_is_rejected() {
        assert!(!judge_summary("", 200).accepted);
        assert!(!judge_summary("   ", 200).accepted);
    }
}
