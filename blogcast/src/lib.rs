// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Blogcast
//!
//! Job orchestration service that turns a submitted blog URL into a
//! narrated slide video. This crate wires the [`blogcast_domain`] business
//! rules to the outside world:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           PRESENTATION (this crate)          │
//! │  - axum HTTP API (submit/status/download)    │
//! └─────────────────────────────────────────────┘
//!                      │
//! ┌─────────────────────────────────────────────┐
//! │           APPLICATION (this crate)           │
//! │  - admission control, pipeline runner,       │
//! │    worker loop, expiry reaper, progress       │
//! └─────────────────────────────────────────────┘
//!                      │
//! ┌─────────────────────────────────────────────┐
//! │             DOMAIN (blogcast_domain)         │
//! │  - JobAggregate, value objects, ports        │
//! └─────────────────────────────────────────────┘
//!                      ▲
//! ┌─────────────────────────────────────────────┐
//! │         INFRASTRUCTURE (this crate)          │
//! │  - record-store client, quality probe,       │
//! │    stage collaborators, metrics, logging     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The bootstrap concerns (CLI, signals, shutdown coordination, platform
//! facts, process configuration) live one layer further out, in
//! [`blogcast_bootstrap`], and are wired together in `main`.

pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use blogcast_domain::{
    ClientIp, JobAggregate, JobError, JobEvent, JobId, JobRecord, JobStatus, Progress, ProgressMessage, SourceUrl,
    StageKind,
};
