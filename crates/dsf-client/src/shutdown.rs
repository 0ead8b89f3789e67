//! Coordinated shutdown of open connections.
//!
//! Blocking reads on a connection only return once its socket is shut
//! down. The entry point owns one [`ShutdownCoordinator`], registers a
//! [`Closer`] for every connection and bridge it opens, and asks the
//! coordinator to close them all when a termination signal arrives.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::{info, warn};

const SHUTDOWN_TARGET: &str = "dsf_client::shutdown";

/// Something that can be closed from any thread.
#[cfg_attr(test, mockall::automock)]
pub trait Closer: Send + Sync {
    /// Closes the resource. Closing twice must be harmless.
    ///
    /// # Errors
    ///
    /// Returns the IO error reported while closing.
    fn close(&self) -> io::Result<()>;
}

/// Errors reported while waiting for termination signals.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The signal listener thread could not be started.
    #[error("failed to start the signal listener: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

#[derive(Default)]
struct Registry {
    closers: Vec<Box<dyn Closer>>,
    closed: bool,
}

/// Closes registered resources exactly once.
#[derive(Default)]
pub struct ShutdownCoordinator {
    registry: Mutex<Registry>,
}

impl std::fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.lock();
        f.debug_struct("ShutdownCoordinator")
            .field("registered", &registry.closers.len())
            .field("closed", &registry.closed)
            .finish()
    }
}

impl ShutdownCoordinator {
    /// Creates an empty coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `closer`. After [`ShutdownCoordinator::close_all`] has run
    /// the closer is closed immediately instead.
    pub fn register(&self, closer: Box<dyn Closer>) {
        let mut registry = self.lock();
        if registry.closed {
            drop(registry);
            close_one(closer.as_ref());
        } else {
            registry.closers.push(closer);
        }
    }

    /// Returns true once [`ShutdownCoordinator::close_all`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Closes every registered closer and returns how many were closed.
    /// Later calls close nothing.
    pub fn close_all(&self) -> usize {
        let closers = {
            let mut registry = self.lock();
            if registry.closed {
                return 0;
            }
            registry.closed = true;
            std::mem::take(&mut registry.closers)
        };
        for closer in &closers {
            close_one(closer.as_ref());
        }
        info!(target: SHUTDOWN_TARGET, closed = closers.len(), "connections closed");
        closers.len()
    }

    /// Blocks until SIGINT, SIGTERM or SIGQUIT arrives, then closes
    /// everything.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Install`] when the handlers cannot be
    /// installed.
    pub fn wait_for_signal(&self) -> Result<(), ShutdownError> {
        let signals = install_handlers()?;
        self.close_on_signal(signals);
        Ok(())
    }

    /// Installs the signal handlers and waits for a signal on a background
    /// thread.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Install`] when the handlers cannot be
    /// installed and [`ShutdownError::Spawn`] when the thread cannot start.
    pub fn listen_for_signals(self: &Arc<Self>) -> Result<JoinHandle<()>, ShutdownError> {
        let signals = install_handlers()?;
        let coordinator = Arc::clone(self);
        thread::Builder::new()
            .name("dsf-signals".to_owned())
            .spawn(move || coordinator.close_on_signal(signals))
            .map_err(|source| ShutdownError::Spawn { source })
    }

    fn close_on_signal(&self, mut signals: Signals) {
        if let Some(signal) = signals.forever().next() {
            info!(target: SHUTDOWN_TARGET, signal, "shutdown signal received");
        }
        self.close_all();
    }
}

fn install_handlers() -> Result<Signals, ShutdownError> {
    Signals::new([SIGTERM, SIGINT, SIGQUIT]).map_err(|source| ShutdownError::Install { source })
}

fn close_one(closer: &dyn Closer) {
    if let Err(error) = closer.close() {
        warn!(target: SHUTDOWN_TARGET, error = %error, "failed to close connection");
    }
}
