//! ssh-exec: remote command execution over the system SSH client
//!
//! This crate runs commands on remote hosts by shelling out to the external
//! OpenSSH client, and recovers the command's exit status, stdout and
//! stderr reliably even when the transport pollutes the stream with
//! banners, MOTDs or multiplexing notices.
//!
//! # Features
//!
//! - **Async-first design** with Tokio, plus a blocking facade
//! - **Injection-proof command building**: every interpolated value is its
//!   own argv element
//! - **Marker-frame recovery** (safe mode): exit status and byte-exact
//!   output are captured remotely and smuggled through the stream encoded
//! - **Password helper support** for clients that refuse non-interactive
//!   password input
//! - **Connection multiplexing** configured through
//!   ControlMaster/ControlPersist, never managed in-process
//!
//! # Example
//!
//! ```ignore
//! use ssh_exec::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let backend = SshBackend::safe("alice@example.com:2222", BackendConfig::default())?;
//!     let result = backend.run("uname -r").await?;
//!     assert!(result.success());
//!     println!("{}", result.stdout_lossy());
//!     Ok(())
//! }
//! ```

// Core types
pub mod config;
pub mod error;
pub mod hostspec;
pub mod prelude;
pub mod types;

// Core modules
pub mod backend;
pub mod command;
pub mod frame;
pub mod quote;
pub mod sync;
pub mod transport;

pub use backend::{RecoveryMode, SshBackend};
pub use command::CommandLine;
pub use config::{
    BackendConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_CONTROL_PERSIST, DEFAULT_PASSWORD_PROGRAM,
    DEFAULT_SSH_PROGRAM,
};
pub use error::{ExecError, PayloadStream, ProtocolError, Result, TransportError};
pub use frame::{Frame, MARKER_END, MARKER_START};
pub use hostspec::HostSpec;
pub use sync::SyncBackend;
pub use transport::{RawOutput, SSH_TRANSPORT_FAILURE};
pub use types::{CommandResult, ProcessStatus};
