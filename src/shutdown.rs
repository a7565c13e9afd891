use std::io;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Process stop requests: Ctrl-C everywhere, plus SIGTERM on unix.
///
/// Handlers are registered by [`ShutdownSignal::install`], so a signal that
/// arrives before [`ShutdownSignal::recv`] is polled is not lost.
pub struct ShutdownSignal {
    #[cfg(unix)]
    terminate: signal::unix::Signal,
}

impl ShutdownSignal {
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            terminate: signal::unix::signal(signal::unix::SignalKind::terminate())?,
        })
    }

    /// Wait for the first stop request and return its name.
    #[cfg(unix)]
    pub async fn recv(mut self) -> io::Result<&'static str> {
        tokio::select! {
            res = signal::ctrl_c() => res.map(|()| "SIGINT"),
            _ = self.terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(self) -> io::Result<&'static str> {
        signal::ctrl_c().await.map(|()| "ctrl-c")
    }

    /// Cancel `cancel` when a stop request arrives.
    pub fn cancel_on_receipt(self, cancel: CancellationToken) {
        tokio::spawn(async move {
            match self.recv().await {
                Ok(name) => {
                    info!(signal = name, "Received shutdown signal, stopping worker...");
                    cancel.cancel();
                }
                Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
            }
        });
    }
}
