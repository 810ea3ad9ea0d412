// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Blogcast Domain
//!
//! The job orchestration domain: the business rules for turning a submitted
//! blog URL into a narrated slide video, independent of HTTP, the record
//! store's wire format, or how the four pipeline stages are actually
//! invoked.
//!
//! ## Module Structure
//!
//! - [`value_objects`] - self-validating, identity-free types (`JobId`,
//!   `SourceUrl`, `Progress`, `JobStatus`, `StageKind`, ...)
//! - [`entities`] - `JobRecord`, the persisted shape of one submission
//! - [`aggregates`] - `JobAggregate`, the only thing allowed to mutate a
//!   `JobRecord`'s state, enforcing the transition DAG and its invariants
//! - [`repositories`] - ports to the record store and the pipeline stages
//! - [`services`] - the content-quality acceptance rule and progress-band
//!   translation
//! - [`events`] - lifecycle events raised by the aggregate

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use aggregates::JobAggregate;
pub use entities::JobRecord;
pub use error::JobError;
pub use events::JobEvent;
pub use value_objects::{ClientIp, JobId, JobStatus, Progress, ProgressMessage, SourceUrl, StageKind};
