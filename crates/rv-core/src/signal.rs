//! Process shutdown signals

use tokio_util::sync::CancellationToken;

/// Wait for Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown...");
        }
    }
}

/// Spawn a task that cancels `cancel` once a shutdown signal arrives
pub fn cancel_on_shutdown(cancel: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });
}
