// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Repositories
//!
//! Contracts that keep the domain independent of its two external
//! collaborators: the record store ([`job_repository`], C1) and the four
//! pipeline stages ([`stage_executor`], C5/§6.4). Concrete implementations
//! live in the infrastructure layer; this module only fixes the shape of
//! the calls.

pub mod job_repository;
pub mod stage_executor;

pub use job_repository::{JobPatch, JobRepository, SortOrder};
pub use stage_executor::{CancellationSignal, NullProgressSink, PipelineStage, ProgressSink, StageConfig, StageInvocation};
