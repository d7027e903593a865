// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! OS signal handling. Listens for SIGTERM/SIGINT (and SIGHUP on Unix) and
//! triggers the shutdown coordinator's cancellation token; the coordinator
//! owns the grace period, this module only owns hearing the signal.

use crate::shutdown::ShutdownCoordinator;

/// Spawns a task that awaits SIGTERM or Ctrl-C (SIGINT) and, on Unix,
/// SIGHUP, then calls `coordinator.initiate_shutdown()`.
pub fn install(coordinator: ShutdownCoordinator) {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("shutdown signal received");
        coordinator.initiate_shutdown();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sighup.recv() => {}
        _ = tokio::signal::ctrl_c() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn install_does_not_panic_before_any_signal() {
        let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
        install(coordinator.clone());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!coordinator.is_shutting_down());
    }
}
