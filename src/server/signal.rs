// Signal handling module
//
// Supported signals:
// - SIGINT:  Stop (Ctrl+C)
// - SIGTERM: Stop
// No graceful drain: the accept loop stops and the process exits 0.

use crate::logger;

/// Resolve when the operator asks the server to stop
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigint, mut sigterm) = match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(e), _) | (_, Err(e)) => {
            logger::log_warning(&format!("Failed to register signal handlers: {e}; using Ctrl+C only"));
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        // Without a signal source, run until killed
        std::future::pending::<()>().await;
    }
}
