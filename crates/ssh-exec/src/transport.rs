//! Transport invocation.
//!
//! Runs a built command line as a child process with piped stdio, bounded
//! by the configured overall timeout. SSH wire semantics live entirely in
//! the external client; this module only drives the process.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, trace};

use crate::command::CommandLine;
use crate::error::TransportError;
use crate::types::ProcessStatus;

/// The SSH client's reserved exit status for its own failures.
pub const SSH_TRANSPORT_FAILURE: i32 = 255;

/// Raw output of one client invocation, before any recovery.
#[derive(Debug)]
pub struct RawOutput {
    /// How the client process ended.
    pub status: ProcessStatus,

    /// The client's standard output.
    pub stdout: Vec<u8>,

    /// The client's standard error.
    pub stderr: Vec<u8>,
}

/// Spawn the command line and wait for it to finish.
///
/// stdin is closed so the client can never block on interactive input.
/// When `timeout` elapses before the child exits, the child is killed and
/// the call fails with [`TransportError::Timeout`].
///
/// # Errors
///
/// [`TransportError::Spawn`] when the program cannot be started (e.g. the
/// binary is not installed), [`TransportError::Timeout`] on an elapsed
/// bound, [`TransportError::Io`] on any other process I/O failure.
pub async fn invoke(
    cmdline: &CommandLine,
    timeout: Option<Duration>,
) -> Result<RawOutput, TransportError> {
    debug!(program = %cmdline.program, args = cmdline.args.len(), "spawning client");

    let child = Command::new(&cmdline.program)
        .args(&cmdline.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| TransportError::Spawn {
            program: cmdline.program.clone(),
            source,
        })?;

    let wait = child.wait_with_output();
    let output = match timeout {
        Some(duration) => tokio::time::timeout(duration, wait)
            .await
            .map_err(|_| TransportError::Timeout { duration })??,
        None => wait.await?,
    };

    let status = ProcessStatus::from(output.status);
    trace!(
        %status,
        stdout_bytes = output.stdout.len(),
        stderr_bytes = output.stderr.len(),
        "client finished"
    );

    Ok(RawOutput {
        status,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandLine {
        CommandLine {
            program: "/bin/sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    #[tokio::test]
    async fn captures_output_and_status() {
        let out = invoke(&sh("echo out; echo err >&2; exit 3"), None)
            .await
            .unwrap();
        assert_eq!(out.status, ProcessStatus::Exited(3));
        assert_eq!(out.stdout, b"out\n");
        assert_eq!(out.stderr, b"err\n");
    }

    #[tokio::test]
    async fn spawn_failure_names_the_program() {
        let cmdline = CommandLine {
            program: "/nonexistent/ssh-client".to_string(),
            args: Vec::new(),
        };
        let err = invoke(&cmdline, None).await.unwrap_err();
        match err {
            TransportError::Spawn { program, .. } => {
                assert_eq!(program, "/nonexistent/ssh-client");
            }
            other => panic!("expected spawn error, got {other}"),
        }
    }

    #[tokio::test]
    async fn timeout_kills_the_child() {
        let err = invoke(&sh("sleep 5"), Some(Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
    }

    #[tokio::test]
    async fn stdin_is_closed() {
        // `cat` exits immediately on EOF instead of waiting for input.
        let out = invoke(&sh("cat"), Some(Duration::from_secs(5)))
            .await
            .unwrap();
        assert!(out.status.success());
        assert!(out.stdout.is_empty());
    }
}
