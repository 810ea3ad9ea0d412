// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Signal Handling
//!
//! Listens for SIGTERM/SIGINT (and SIGHUP on Unix) and triggers a
//! [`crate::shutdown::ShutdownCoordinator`]. Both the `api` and `worker`
//! roles call [`wait_for_shutdown_signal`] from their top-level run loop
//! so a `docker stop` or `kubectl delete pod` drains in-flight jobs
//! instead of dropping them mid-render.

use crate::shutdown::ShutdownCoordinator;
use std::sync::Arc;

/// Blocks until a termination signal arrives, then calls
/// [`ShutdownCoordinator::initiate_shutdown`].
///
/// On Unix this listens for SIGTERM, SIGINT, and SIGHUP. On other
/// platforms only Ctrl-C is available.
pub async fn wait_for_shutdown_signal(coordinator: Arc<ShutdownCoordinator>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");
        let mut sighup = signal(SignalKind::hangup()).expect("failed to register SIGHUP handler");

        tokio::select! {
            _ = sigterm.recv() => tracing::info!("received SIGTERM"),
            _ = sigint.recv() => tracing::info!("received SIGINT"),
            _ = sighup.recv() => tracing::info!("received SIGHUP"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("received Ctrl-C");
    }

    coordinator.initiate_shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_coordinator_reaches_shutting_down_state_once_initiated() {
        let coordinator = Arc::new(ShutdownCoordinator::new(Duration::from_millis(50)));
        assert!(!coordinator.is_shutting_down());
        coordinator.initiate_shutdown();
        assert!(coordinator.is_shutting_down());
    }
}
