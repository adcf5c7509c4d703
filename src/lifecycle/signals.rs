//! OS signal handling.

/// Resolve when Ctrl+C (SIGINT) is received.
///
/// If the handler cannot be installed the error is logged and the future
/// never resolves, leaving shutdown to the process supervisor.
pub async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
