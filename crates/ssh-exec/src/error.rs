//! Error types for ssh-exec.
//!
//! This module defines all error types used throughout the library.
//! Errors carry the evidence a caller needs to tell the three failure
//! layers apart: the remote command failed, the connection failed, or
//! the result-recovery protocol broke. Protocol errors attach the raw
//! transport output, since that output is the misbehavior being reported.

use std::time::Duration;

use thiserror::Error;

use crate::types::CommandResult;

/// Maximum length of raw transport output to display in error messages.
const MAX_RAW_DISPLAY: usize = 300;

/// Format raw transport output for display, truncating if necessary.
fn format_raw_snippet(raw: &[u8]) -> String {
    if raw.is_empty() {
        return "(empty transport output)".to_string();
    }

    let text = String::from_utf8_lossy(raw);
    if text.chars().count() <= MAX_RAW_DISPLAY {
        return format!("transport output ({} bytes): {text:?}", raw.len());
    }

    let head: String = text.chars().take(MAX_RAW_DISPLAY).collect();
    format!(
        "transport output ({} bytes, truncated): {head:?}...",
        raw.len()
    )
}

/// The main error type for ssh-exec operations.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The connection/session layer failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The result-recovery marker could not be found or decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Invalid configuration or hostspec.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Errors from the connection/session layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The client (or password helper) binary could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// The program that could not be started.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The SSH client exited with its reserved status 255.
    ///
    /// The client reports 255 both for its own connection/authentication
    /// failures and when the remote command itself exited 255; the two are
    /// indistinguishable from the exit status alone, so 255 always fails
    /// the call. The raw result is carried for diagnostics.
    #[error("ssh exited with status 255 (connection failure, or the remote command exited 255): {result}")]
    SshFailure {
        /// The raw result of the failed invocation.
        result: CommandResult,
    },

    /// The invocation did not complete within the configured bound.
    #[error("command did not complete within {duration:?}")]
    Timeout {
        /// The timeout that elapsed.
        duration: Duration,
    },

    /// An I/O error occurred while driving the child process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which decoded payload a protocol error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStream {
    /// The remote command's standard output.
    Stdout,
    /// The remote command's standard error.
    Stderr,
}

impl std::fmt::Display for PayloadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Errors from the result-recovery protocol.
///
/// Every variant attaches the raw transport stdout: a protocol failure is
/// evidence of transport misbehavior the caller may need to inspect.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The start marker never appeared in the transport output.
    ///
    /// The remote shell did not execute the recovery wrapper as expected,
    /// e.g. it is not POSIX-compatible or the output was truncated.
    #[error("start marker not found in transport output\n{}", format_raw_snippet(raw))]
    MarkerNotFound {
        /// Raw transport stdout.
        raw: Vec<u8>,
    },

    /// The start marker appeared but the end marker did not.
    #[error("marker frame has no terminator\n{}", format_raw_snippet(raw))]
    Truncated {
        /// Raw transport stdout.
        raw: Vec<u8>,
    },

    /// The frame body did not contain the expected three fields.
    #[error("marker frame is missing fields\n{}", format_raw_snippet(raw))]
    MissingFields {
        /// Raw transport stdout.
        raw: Vec<u8>,
    },

    /// The exit status field was not an integer.
    #[error("invalid exit status {field:?} in marker frame\n{}", format_raw_snippet(raw))]
    InvalidStatus {
        /// The rejected field content.
        field: String,
        /// Raw transport stdout.
        raw: Vec<u8>,
    },

    /// A payload field was not valid base64.
    #[error("invalid base64 in {stream} payload: {source}\n{}", format_raw_snippet(raw))]
    Payload {
        /// Which payload failed to decode.
        stream: PayloadStream,
        /// The underlying decode error.
        #[source]
        source: base64::DecodeError,
        /// Raw transport stdout.
        raw: Vec<u8>,
    },
}

impl ProtocolError {
    /// The raw transport stdout that could not be parsed.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        match self {
            Self::MarkerNotFound { raw }
            | Self::Truncated { raw }
            | Self::MissingFields { raw }
            | Self::InvalidStatus { raw, .. }
            | Self::Payload { raw, .. } => raw,
        }
    }
}

/// Result type alias for ssh-exec operations.
pub type Result<T> = std::result::Result<T, ExecError>;

impl ExecError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a transport error.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a protocol error.
    #[must_use]
    pub const fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Get the raw transport output if this error carries it.
    #[must_use]
    pub fn raw_output(&self) -> Option<&[u8]> {
        match self {
            Self::Protocol(p) => Some(p.raw()),
            Self::Transport(TransportError::SshFailure { result }) => Some(&result.stdout),
            _ => None,
        }
    }
}
