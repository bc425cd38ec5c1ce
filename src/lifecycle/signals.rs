//! OS signal handling.
//!
//! Translates SIGINT/SIGTERM into completion of a single future; the caller
//! decides what to do with it (normally: trigger the shutdown broadcast).

/// Wait for a termination signal (Ctrl+C, or SIGTERM on Unix).
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("shutdown signal received");
}
