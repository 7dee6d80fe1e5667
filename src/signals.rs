//! Process termination signals.
//!
//! Handlers are registered up front with [`ShutdownSignals::register`] so a
//! registration failure is reported at startup instead of once the service
//! is already running.

use std::io;

/// Registered SIGINT, SIGTERM and SIGQUIT handlers.
#[cfg(unix)]
pub struct ShutdownSignals {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
    sigquit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    /// Registers the handlers. Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns error if a signal handler cannot be registered.
    pub fn register() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Waits for the first of SIGINT, SIGTERM or SIGQUIT.
    pub async fn recv(&mut self) {
        tokio::select! {
            _ = self.sigint.recv()  => {},
            _ = self.sigterm.recv() => {},
            _ = self.sigquit.recv() => {},
        }
    }
}

/// Ctrl-C handler.
#[cfg(not(unix))]
pub struct ShutdownSignals {
    _private: (),
}

#[cfg(not(unix))]
impl ShutdownSignals {
    /// Prepares the Ctrl-C handler.
    ///
    /// # Errors
    /// Never fails on this platform; registration happens on first wait.
    pub fn register() -> io::Result<Self> {
        Ok(Self { _private: () })
    }

    /// Waits for Ctrl-C. Never resolves if the handler cannot be installed.
    pub async fn recv(&mut self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
