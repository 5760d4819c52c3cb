// Signal handling module
//
// SIGINT and SIGTERM both request a graceful shutdown: the listener stops
// accepting and the server future returns.

use std::sync::Arc;

use crate::logger::Logger;

/// Resolve once SIGINT (Ctrl+C) or SIGTERM is received
///
/// A handler that cannot be registered is logged and never fires.
pub async fn shutdown_signal(logger: Arc<dyn Logger>) {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                logger.error(&format!("Failed to listen for SIGINT: {e}"));
                std::future::pending().await
            }
        }
    };

    let signal = tokio::select! {
        name = interrupt => name,
        name = terminate(&*logger) => name,
    };
    logger.info(&format!("{signal} received, shutting down"));
}

#[cfg(unix)]
async fn terminate(logger: &dyn Logger) -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
            "SIGTERM"
        }
        Err(e) => {
            logger.error(&format!("Failed to register SIGTERM handler: {e}"));
            std::future::pending().await
        }
    }
}

/// Windows fallback - only Ctrl+C is supported
#[cfg(not(unix))]
async fn terminate(_logger: &dyn Logger) -> &'static str {
    std::future::pending().await
}
