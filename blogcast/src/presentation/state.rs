// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use crate::application::admission::AdmissionController;
use blogcast_bootstrap::TimeSource;
use blogcast_domain::repositories::job_repository::JobRepository;
use std::path::PathBuf;
use std::sync::Arc;

struct Inner {
    repository: Arc<dyn JobRepository>,
    admission: Arc<AdmissionController>,
    time: Arc<dyn TimeSource>,
    data_root: PathBuf,
}

/// Shared state handed to every axum handler. Cheap to clone - everything
/// behind it is already `Arc`.
#[derive(Clone)]
pub struct AppState(Arc<Inner>);

impl AppState {
    pub fn new(repository: Arc<dyn JobRepository>, admission: Arc<AdmissionController>, time: Arc<dyn TimeSource>, data_root: PathBuf) -> Self {
        Self(Arc::new(Inner {
            repository,
            admission,
            time,
            data_root,
        }))
    }

    pub fn repository(&self) -> &Arc<dyn JobRepository> {
        &self.0.repository
    }

    pub fn admission(&self) -> &Arc<AdmissionController> {
        &self.0.admission
    }

    pub fn time(&self) -> &Arc<dyn TimeSource> {
        &self.0.time
    }

    pub fn data_root(&self) -> &PathBuf {
        &self.0.data_root
    }
}
