//! Turns SIGINT/SIGTERM into cancellation of the shared token.

use std::io;

use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Spawns a task that cancels `cancel` on the first shutdown signal.
pub(crate) fn spawn_signal_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            res = wait_for_signal() => match res {
                Ok(signal) => {
                    warn!(%signal, "received shutdown signal, shutting down...");
                    cancel.cancel();
                }
                Err(err) => error!(%err, "failed to install signal handlers"),
            },
            _ = cancel.cancelled() => {}
        }
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

#[cfg(not(unix))]
async fn wait_for_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}
