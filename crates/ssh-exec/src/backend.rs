//! The SSH backend.
//!
//! Composes the command builder, the transport and the recovery protocol
//! into the single public entry point, [`SshBackend::run`]. The raw and
//! safe-recovery variants are the same backend with a different
//! [`RecoveryMode`] chosen at construction.

use tracing::debug;

use crate::command;
use crate::config::BackendConfig;
use crate::error::{Result, TransportError};
use crate::frame;
use crate::hostspec::HostSpec;
use crate::transport::{self, SSH_TRANSPORT_FAILURE};
use crate::types::CommandResult;

/// How a backend turns raw transport output into a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Trust the transport: the client's exit status and streams are
    /// returned as-is. Banners and MOTDs end up in the output.
    #[default]
    Raw,

    /// Wrap the command in the marker-frame fragment and decode the frame
    /// from the stream, so the result is immune to transport pollution.
    Safe,
}

impl RecoveryMode {
    /// Get the mode name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Safe => "safe",
        }
    }

    /// Check if this is the safe-recovery mode.
    #[must_use]
    pub const fn is_safe(self) -> bool {
        matches!(self, Self::Safe)
    }
}

/// A backend bound to one host with one immutable configuration.
///
/// Each [`run`](Self::run) spawns one client process and waits for it;
/// there is no internal concurrency and no state shared between calls, so
/// one backend can serve concurrent `run` calls from separate tasks.
/// Connection reuse across calls is delegated to the client's own
/// multiplexing (ControlMaster/ControlPersist); the backend holds no
/// connection handle.
#[derive(Debug, Clone)]
pub struct SshBackend {
    host: HostSpec,
    config: BackendConfig,
    mode: RecoveryMode,
}

impl SshBackend {
    /// Create a raw backend from a hostspec string.
    pub fn new(hostspec: &str, config: BackendConfig) -> Result<Self> {
        Self::with_mode(hostspec, config, RecoveryMode::Raw)
    }

    /// Create a safe-recovery backend from a hostspec string.
    pub fn safe(hostspec: &str, config: BackendConfig) -> Result<Self> {
        Self::with_mode(hostspec, config, RecoveryMode::Safe)
    }

    /// Create a backend with an explicit recovery mode.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the hostspec does not parse or
    /// the configuration is invalid.
    pub fn with_mode(hostspec: &str, config: BackendConfig, mode: RecoveryMode) -> Result<Self> {
        let host = HostSpec::parse(hostspec)?;
        Self::from_host(host, config, mode)
    }

    /// Create a backend from an already-parsed host.
    pub fn from_host(host: HostSpec, config: BackendConfig, mode: RecoveryMode) -> Result<Self> {
        config.validate()?;
        Ok(Self { host, config, mode })
    }

    /// The target host.
    #[must_use]
    pub const fn host(&self) -> &HostSpec {
        &self.host
    }

    /// The backend configuration.
    #[must_use]
    pub const fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// The recovery mode.
    #[must_use]
    pub const fn mode(&self) -> RecoveryMode {
        self.mode
    }

    /// Run a command on the remote host.
    ///
    /// In [`RecoveryMode::Safe`], the returned exit status and payloads
    /// come from the decoded marker frame, not from the client process;
    /// the client's own exit status is only consulted for the 255 check.
    ///
    /// # Errors
    ///
    /// `ExecError::Transport` when the client cannot be spawned, exceeds
    /// the command timeout, or exits 255 (its reserved status — a
    /// connection failure and a remote command exiting 255 are
    /// indistinguishable, so both fail the call). `ExecError::Protocol`
    /// when the marker frame cannot be located or decoded in safe mode.
    /// Nothing is retried internally; the remote command may not be
    /// idempotent, so retry policy belongs to the caller.
    pub async fn run(&self, command: &str) -> Result<CommandResult> {
        debug!(host = %self.host, mode = self.mode.name(), command, "running remote command");
        match self.mode {
            RecoveryMode::Raw => self.run_ssh(command).await,
            RecoveryMode::Safe => {
                let wrapped = frame::wrap(command);
                let raw = self.run_ssh(&wrapped).await?;
                let frame = frame::decode(&raw.stdout)?;
                Ok(CommandResult::new(
                    frame.exit_status,
                    command,
                    frame.stdout,
                    frame.stderr,
                ))
            }
        }
    }

    /// One client invocation, with the 255 policy applied.
    async fn run_ssh(&self, remote_command: &str) -> Result<CommandResult> {
        let cmdline = command::build(&self.host, &self.config, remote_command);
        let raw = transport::invoke(&cmdline, self.config.command_timeout).await?;

        let result = CommandResult::new(
            raw.status.code(),
            remote_command,
            raw.stdout,
            raw.stderr,
        );
        if result.exit_status == SSH_TRANSPORT_FAILURE {
            return Err(TransportError::SshFailure { result }.into());
        }
        Ok(result)
    }
}
