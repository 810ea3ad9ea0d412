// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Adapters to everything outside the process: the external record store
//! (C1), the content-quality probe (C2), the four pipeline stage
//! collaborators (C5), structured logging, and Prometheus metrics.

pub mod logging;
pub mod metrics;
pub mod quality_probe_client;
pub mod record_store_client;
pub mod stages;

pub use quality_probe_client::HttpQualityProbeClient;
pub use record_store_client::RecordStoreClient;
