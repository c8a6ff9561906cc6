//! Common types for ssh-exec.
//!
//! This module defines the result of a remote command invocation and the
//! exit-status mapping for the locally spawned client process.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum bytes of a payload shown by the `Display` impl.
const MAX_DISPLAY_PAYLOAD: usize = 120;

fn payload_snippet(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    if text.chars().count() <= MAX_DISPLAY_PAYLOAD {
        format!("{text:?}")
    } else {
        let head: String = text.chars().take(MAX_DISPLAY_PAYLOAD).collect();
        format!("{head:?}...")
    }
}

/// The result of one remote command invocation.
///
/// `command` is the command that was logically requested, for diagnostics;
/// never the wrapped/escaped form sent over the transport. The payloads are
/// raw bytes: remote output is not guaranteed to be valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// The remote command's exit status.
    pub exit_status: i32,

    /// The command that was requested.
    pub command: String,

    /// Captured standard output.
    pub stdout: Vec<u8>,

    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl CommandResult {
    /// Create a new command result.
    #[must_use]
    pub fn new(
        exit_status: i32,
        command: impl Into<String>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    ) -> Self {
        Self {
            exit_status,
            command: command.into(),
            stdout,
            stderr,
        }
    }

    /// Check if the command exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Standard output as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Standard error as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command {:?} exited with status {}",
            self.command, self.exit_status
        )?;
        if !self.stdout.is_empty() {
            write!(f, ", stdout: {}", payload_snippet(&self.stdout))?;
        }
        if !self.stderr.is_empty() {
            write!(f, ", stderr: {}", payload_snippet(&self.stderr))?;
        }
        Ok(())
    }
}

/// Exit status of the locally spawned client process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Process exited with a code.
    Exited(i32),

    /// Process was terminated by a signal (Unix).
    Signaled(i32),

    /// Exit status is unknown.
    Unknown,
}

impl ProcessStatus {
    /// Check if the process exited successfully (code 0).
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// Get the signal number if the process was signaled.
    #[must_use]
    pub const fn signal(self) -> Option<i32> {
        match self {
            Self::Signaled(sig) => Some(sig),
            _ => None,
        }
    }

    /// Collapse to a single exit code.
    ///
    /// Signal termination maps shell-style to `128 + signal`, so the
    /// client's reserved status 255 is only ever seen when the client
    /// actually exited with it.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(sig) => 128 + sig,
            Self::Unknown => -1,
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with code {code}"),
            Self::Signaled(sig) => write!(f, "terminated by signal {sig}"),
            Self::Unknown => write!(f, "unknown exit status"),
        }
    }
}

impl From<std::process::ExitStatus> for ProcessStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(code) = status.code() {
                Self::Exited(code)
            } else if let Some(sig) = status.signal() {
                Self::Signaled(sig)
            } else {
                Self::Unknown
            }
        }

        #[cfg(not(unix))]
        {
            if let Some(code) = status.code() {
                Self::Exited(code)
            } else {
                Self::Unknown
            }
        }
    }
}
