//! Synchronous wrapper for the async backend.
//!
//! This module provides a blocking API for users who prefer or require
//! synchronous operations instead of async/await.

use tokio::runtime::{Builder, Runtime};

use crate::backend::{RecoveryMode, SshBackend};
use crate::config::BackendConfig;
use crate::error::{Result, TransportError};
use crate::hostspec::HostSpec;
use crate::types::CommandResult;

/// A synchronous backend wrapper.
///
/// Wraps an async [`SshBackend`] and a current-thread runtime; each
/// [`run`](Self::run) blocks until the remote command completes.
pub struct SyncBackend {
    /// The tokio runtime.
    runtime: Runtime,
    /// The inner async backend.
    inner: SshBackend,
}

impl SyncBackend {
    /// Create a raw blocking backend.
    pub fn new(hostspec: &str, config: BackendConfig) -> Result<Self> {
        Self::with_mode(hostspec, config, RecoveryMode::Raw)
    }

    /// Create a safe-recovery blocking backend.
    pub fn safe(hostspec: &str, config: BackendConfig) -> Result<Self> {
        Self::with_mode(hostspec, config, RecoveryMode::Safe)
    }

    /// Create a blocking backend with an explicit recovery mode.
    ///
    /// # Errors
    ///
    /// Returns an error when the hostspec or configuration is invalid, or
    /// the runtime cannot be created.
    pub fn with_mode(hostspec: &str, config: BackendConfig, mode: RecoveryMode) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(TransportError::Io)?;
        let inner = SshBackend::with_mode(hostspec, config, mode)?;
        Ok(Self { runtime, inner })
    }

    /// The target host.
    #[must_use]
    pub const fn host(&self) -> &HostSpec {
        self.inner.host()
    }

    /// The backend configuration.
    #[must_use]
    pub const fn config(&self) -> &BackendConfig {
        self.inner.config()
    }

    /// The recovery mode.
    #[must_use]
    pub const fn mode(&self) -> RecoveryMode {
        self.inner.mode()
    }

    /// Run a command on the remote host, blocking until it completes.
    ///
    /// # Errors
    ///
    /// Same contract as [`SshBackend::run`].
    pub fn run(&self, command: &str) -> Result<CommandResult> {
        self.runtime.block_on(self.inner.run(command))
    }
}
