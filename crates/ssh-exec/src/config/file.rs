//! File-based configuration loading.
//!
//! Loads a [`BackendConfig`] from a TOML file. Absent keys keep their
//! defaults; durations are given in whole seconds.
//!
//! ```toml
//! identity_file = "/home/alice/.ssh/id_ed25519"
//! connect_timeout = 5
//! control_persist = 0
//! extra_args = "-o StrictHostKeyChecking=no"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::config::BackendConfig;
use crate::error::{ExecError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    ssh_config: Option<PathBuf>,
    identity_file: Option<PathBuf>,
    connect_timeout: Option<u64>,
    control_path: Option<String>,
    control_persist: Option<u64>,
    extra_args: Option<String>,
    ssh_program: Option<String>,
    password_program: Option<String>,
    command_timeout: Option<u64>,
}

/// Load a configuration from a TOML file.
pub fn load(path: &Path) -> Result<BackendConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ExecError::config(format!("cannot read {}: {e}", path.display())))?;
    parse(&text)
}

/// Parse a configuration from TOML text.
pub fn parse(text: &str) -> Result<BackendConfig> {
    let file: FileConfig =
        toml::from_str(text).map_err(|e| ExecError::config(format!("invalid config file: {e}")))?;

    let mut config = BackendConfig::default();
    if let Some(path) = file.ssh_config {
        config.ssh_config = Some(path);
    }
    if let Some(path) = file.identity_file {
        config.identity_file = Some(path);
    }
    if let Some(secs) = file.connect_timeout {
        config.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(path) = file.control_path {
        config.control_path = Some(path);
    }
    if let Some(secs) = file.control_persist {
        config.control_persist = Duration::from_secs(secs);
    }
    if let Some(args) = file.extra_args {
        config.extra_args = Some(args);
    }
    if let Some(program) = file.ssh_program {
        config.ssh_program = program;
    }
    if let Some(program) = file.password_program {
        config.password_program = program;
    }
    config.command_timeout = file.command_timeout.map(Duration::from_secs);

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = parse(
            r#"
            ssh_config = "/etc/ssh/ssh_config"
            identity_file = "/home/alice/.ssh/id_ed25519"
            connect_timeout = 5
            control_path = "/tmp/cm-%r@%h:%p"
            control_persist = 120
            extra_args = "-o StrictHostKeyChecking=no"
            ssh_program = "/usr/bin/ssh"
            command_timeout = 300
            "#,
        )
        .unwrap();

        assert_eq!(config.ssh_config, Some(PathBuf::from("/etc/ssh/ssh_config")));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.control_persist, Duration::from_secs(120));
        assert_eq!(config.ssh_program, "/usr/bin/ssh");
        assert_eq!(config.command_timeout, Some(Duration::from_secs(300)));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.ssh_program, "ssh");
    }

    #[test]
    fn zero_disables_multiplexing() {
        let config = parse("control_persist = 0").unwrap();
        assert!(config.control_persist.is_zero());
    }

    #[test]
    fn rejects_zero_connect_timeout() {
        assert!(parse("connect_timeout = 0").is_err());
    }

    #[test]
    fn rejects_unknown_key() {
        assert!(parse("no_such_option = true").is_err());
    }

    #[test]
    fn rejects_missing_file() {
        let err = load(Path::new("/nonexistent/ssh-exec.toml")).unwrap_err();
        assert!(err.is_config());
    }
}
