//! Convenient re-exports for common ssh-exec usage.
//!
//! This module provides a single import to access the most commonly used
//! types from ssh-exec.
//!
//! # Example
//!
//! ```ignore
//! use ssh_exec::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let backend = SshBackend::safe("example.com", BackendConfig::default())?;
//!     let result = backend.run("echo hello").await?;
//!     println!("{}", result.stdout_lossy());
//!     Ok(())
//! }
//! ```

// Backend
pub use crate::backend::{RecoveryMode, SshBackend};

// Configuration
pub use crate::config::BackendConfig;

// Error handling
pub use crate::error::{ExecError, ProtocolError, Result, TransportError};

// Common types
pub use crate::hostspec::HostSpec;
pub use crate::types::{CommandResult, ProcessStatus};

// Sync wrapper
pub use crate::sync::SyncBackend;
