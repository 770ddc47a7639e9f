//! OS signal handling.
//!
//! SIGINT (Ctrl-C) and, on Unix, SIGTERM request a graceful shutdown. Once
//! tokio has registered its handlers the default action never comes back, so
//! a second signal is handled here and forces an immediate exit.

use std::future::Future;

use crate::lifecycle::Shutdown;

/// Exit code used when a second signal interrupts the graceful shutdown.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Trigger `shutdown` on the first termination signal; exit on the second.
pub async fn watch(shutdown: Shutdown) {
    relay(&shutdown, wait_for_signal).await;
    std::process::exit(FORCED_EXIT_CODE);
}

/// Trigger `shutdown` on the first signal and return after the second.
async fn relay<F, Fut>(shutdown: &Shutdown, mut next_signal: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    next_signal().await;
    shutdown.trigger();

    next_signal().await;
    tracing::warn!("Second signal received, exiting without waiting for lookups");
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to register SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT"),
        _ = term.recv() => tracing::info!("Received SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Received Ctrl-C");
    }
}
