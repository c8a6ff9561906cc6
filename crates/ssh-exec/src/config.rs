//! Backend configuration.
//!
//! A [`BackendConfig`] is set once at backend creation and shared read-only
//! across all subsequent `run` calls; nothing mutates it afterward.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ExecError, Result};

pub mod env;
pub mod file;

/// Default connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default control-socket persistence (60 seconds).
pub const DEFAULT_CONTROL_PERSIST: Duration = Duration::from_secs(60);

/// Default SSH client binary.
pub const DEFAULT_SSH_PROGRAM: &str = "ssh";

/// Default password-injection helper binary.
pub const DEFAULT_PASSWORD_PROGRAM: &str = "sshpass";

/// Configuration for an SSH backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Client configuration file passed with `-F`.
    pub ssh_config: Option<PathBuf>,

    /// Identity file passed with `-i`.
    pub identity_file: Option<PathBuf>,

    /// Connection timeout (`-o ConnectTimeout`). Must be nonzero.
    pub connect_timeout: Duration,

    /// Control socket path (`-o ControlPath`), used only when
    /// multiplexing is enabled.
    pub control_path: Option<String>,

    /// How long the control master keeps the connection open
    /// (`-o ControlPersist`). Zero disables multiplexing entirely.
    pub control_persist: Duration,

    /// Raw extra flags, passed through verbatim after shell-style word
    /// splitting. Checked case-insensitively for `connecttimeout`,
    /// `controlmaster` and `controlpath` so the builder never emits a
    /// conflicting duplicate.
    pub extra_args: Option<String>,

    /// The client binary to invoke.
    pub ssh_program: String,

    /// The password-injection helper binary, invoked with the password as
    /// its first argument when the hostspec carries one.
    pub password_program: String,

    /// Upper bound on the whole invocation's wall-clock time. `None`
    /// leaves the bound to the transport's own timeouts.
    pub command_timeout: Option<Duration>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            ssh_config: None,
            identity_file: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            control_path: None,
            control_persist: DEFAULT_CONTROL_PERSIST,
            extra_args: None,
            ssh_program: DEFAULT_SSH_PROGRAM.to_string(),
            password_program: DEFAULT_PASSWORD_PROGRAM.to_string(),
            command_timeout: None,
        }
    }
}

impl BackendConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client configuration file (`-F`).
    #[must_use]
    pub fn ssh_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssh_config = Some(path.into());
        self
    }

    /// Set the identity file (`-i`).
    #[must_use]
    pub fn identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the control socket path.
    #[must_use]
    pub fn control_path(mut self, path: impl Into<String>) -> Self {
        self.control_path = Some(path.into());
        self
    }

    /// Set the control-socket persistence. Zero disables multiplexing.
    #[must_use]
    pub const fn control_persist(mut self, persist: Duration) -> Self {
        self.control_persist = persist;
        self
    }

    /// Set raw extra client flags.
    #[must_use]
    pub fn extra_args(mut self, args: impl Into<String>) -> Self {
        self.extra_args = Some(args.into());
        self
    }

    /// Override the client binary.
    #[must_use]
    pub fn ssh_program(mut self, program: impl Into<String>) -> Self {
        self.ssh_program = program.into();
        self
    }

    /// Override the password-injection helper binary.
    #[must_use]
    pub fn password_program(mut self, program: impl Into<String>) -> Self {
        self.password_program = program.into();
        self
    }

    /// Bound the whole invocation's wall-clock time.
    #[must_use]
    pub const fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        file::load(path.as_ref())
    }

    /// Apply `SSH_EXEC_*` environment variable overrides.
    pub fn overlay_env(self) -> Result<Self> {
        env::apply(self)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero connect timeout, a zero
    /// command timeout, or an empty client program name.
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(ExecError::config("connect timeout must be greater than zero"));
        }
        if self.command_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ExecError::config("command timeout must be greater than zero"));
        }
        if self.ssh_program.is_empty() {
            return Err(ExecError::config("ssh program must not be empty"));
        }
        if self.password_program.is_empty() {
            return Err(ExecError::config("password program must not be empty"));
        }
        Ok(())
    }
}
