use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Wait until the process is asked to stop
#[cfg(unix)]
pub async fn wait_for_signal() {
    // Handle SIGTERM (sent by Kubernetes when pod is terminating)
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            error!("Failed to create SIGTERM signal handler: {}", e);
            return wait_for_ctrl_c().await;
        }
    };
    // Handle SIGINT (Ctrl+C)
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(sigint) => sigint,
        Err(e) => {
            error!("Failed to create SIGINT signal handler: {}", e);
            return wait_for_ctrl_c().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT signal, initiating graceful shutdown");
        }
    }
}

/// Wait until the process is asked to stop
#[cfg(windows)]
pub async fn wait_for_signal() {
    // Handle Ctrl+C
    let mut ctrlc = match ctrl_c() {
        Ok(ctrlc) => ctrlc,
        Err(e) => {
            error!("Failed to create Ctrl+C signal handler: {}", e);
            return wait_for_ctrl_c().await;
        }
    };
    // Handle Ctrl+Break
    let mut ctrlbreak = match ctrl_break() {
        Ok(ctrlbreak) => ctrlbreak,
        Err(e) => {
            error!("Failed to create Ctrl+Break signal handler: {}", e);
            return wait_for_ctrl_c().await;
        }
    };

    tokio::select! {
        _ = ctrlc.recv() => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        }
        _ = ctrlbreak.recv() => {
            info!("Received Ctrl+Break signal, initiating graceful shutdown");
        }
    }
}

/// Portable fallback when the platform handlers cannot be installed
async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        // Never resolve rather than shutting down right away
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, initiating graceful shutdown");
}
