// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Expiry Reaper (C7, §4.7)
//!
//! Periodic task that deletes records (and their artifact directories)
//! past `expires_at`. Runs alongside the worker loop; the two never
//! contend for the same record because an expired record is necessarily
//! already in a terminal state.

use blogcast_bootstrap::shutdown::CancellationToken;
use blogcast_bootstrap::TimeSource;
use blogcast_domain::repositories::job_repository::JobRepository;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct ExpiryReaper {
    repository: Arc<dyn JobRepository>,
    time: Arc<dyn TimeSource>,
    data_root: PathBuf,
    interval: Duration,
}

impl ExpiryReaper {
    pub fn new(repository: Arc<dyn JobRepository>, time: Arc<dyn TimeSource>, data_root: PathBuf, interval: Duration) -> Self {
        Self {
            repository,
            time,
            data_root,
            interval,
        }
    }

    /// Runs until `shutdown` is signalled, ticking every `interval`.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.reap_once().await,
                _ = shutdown.cancelled() => {
                    tracing::info!("expiry reaper stopping");
                    return;
                }
            }
        }
    }

    async fn reap_once(&self) {
        let now = self.time.now_utc();
        let expired = match self.repository.list_expired(now).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list expired jobs");
                return;
            }
        };

        let mut reaped = 0usize;
        for id in &expired {
            let job_dir = self.data_root.join("jobs").join(id.as_str());
            if let Err(e) = tokio::fs::remove_dir_all(&job_dir).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(job_id = %id, dir = %job_dir.display(), error = %e, "failed to remove expired artifact directory");
                }
            }
            match self.repository.delete_job(id).await {
                Ok(()) => reaped += 1,
                Err(e) => tracing::warn!(job_id = %id, error = %e, "failed to delete expired record"),
            }
        }
        if reaped > 0 || !expired.is_empty() {
            tracing::info!(reaped, candidates = expired.len(), "expiry reap cycle complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blogcast_domain::repositories::job_repository::{JobPatch, SortOrder};
    use blogcast_domain::value_objects::{ClientIp, JobId, JobStatus, SourceUrl};
    use blogcast_domain::{JobError, JobRecord};
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTime(DateTime<Utc>);
    impl TimeSource for FixedTime {
        fn now_utc(&self) -> DateTime<Utc> {
            self.0
        }
        fn monotonic_now(&self) -> std::time::Instant {
            std::time::Instant::now()
        }
    }

    #[derive(Default)]
    struct FakeRepo {
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl JobRepository for FakeRepo {
        async fn create_job(&self, _url: SourceUrl, _client_ip: ClientIp, _expires_at: DateTime<Utc>) -> Result<JobRecord, JobError> {
            unimplemented!()
        }
        async fn get_job(&self, _id: &JobId) -> Result<JobRecord, JobError> {
            unimplemented!()
        }
        async fn update_job(&self, _id: &JobId, _patch: JobPatch) -> Result<JobRecord, JobError> {
            unimplemented!()
        }
        async fn delete_job(&self, _id: &JobId) -> Result<(), JobError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn list_by_status(&self, _status: JobStatus, _limit: usize, _sort: SortOrder) -> Result<Vec<JobRecord>, JobError> {
            unimplemented!()
        }
        async fn count_recent_by_ip(&self, _ip: &ClientIp, _since: DateTime<Utc>) -> Result<u64, JobError> {
            unimplemented!()
        }
        async fn count_by_status(&self, _status: JobStatus) -> Result<u64, JobError> {
            unimplemented!()
        }
        async fn list_expired(&self, _now: DateTime<Utc>) -> Result<Vec<JobId>, JobError> {
            Ok(vec![JobId::new("job_1").unwrap(), JobId::new("job_2").unwrap()])
        }
    }

    #[tokio::test]
    async fn reap_once_deletes_every_expired_record() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(FakeRepo::default());
        let reaper = ExpiryReaper::new(repo.clone(), Arc::new(FixedTime(Utc::now())), dir.path().to_path_buf(), Duration::from_secs(1));
        reaper.reap_once().await;
        assert_eq!(repo.deletes.load(Ordering::SeqCst), 2);
    }
}
