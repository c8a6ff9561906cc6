//! Environment-based configuration overrides.
//!
//! Every [`BackendConfig`] field can be overridden with an `SSH_EXEC_*`
//! environment variable; empty values are ignored. Durations are given in
//! whole seconds.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::BackendConfig;
use crate::error::{ExecError, Result};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "SSH_EXEC";

/// Apply environment variable overrides to a configuration.
pub fn apply(config: BackendConfig) -> Result<BackendConfig> {
    apply_with(config, |name| {
        std::env::var(format!("{ENV_PREFIX}_{name}")).ok()
    })
}

/// Apply overrides from an arbitrary lookup, for callers that already hold
/// an environment snapshot.
pub fn apply_with(
    mut config: BackendConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<BackendConfig> {
    let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if let Some(value) = get("SSH_CONFIG") {
        config.ssh_config = Some(PathBuf::from(value));
    }
    if let Some(value) = get("IDENTITY_FILE") {
        config.identity_file = Some(PathBuf::from(value));
    }
    if let Some(value) = get("CONNECT_TIMEOUT") {
        config.connect_timeout = Duration::from_secs(parse_secs("CONNECT_TIMEOUT", &value)?);
    }
    if let Some(value) = get("CONTROL_PATH") {
        config.control_path = Some(value);
    }
    if let Some(value) = get("CONTROL_PERSIST") {
        config.control_persist = Duration::from_secs(parse_secs("CONTROL_PERSIST", &value)?);
    }
    if let Some(value) = get("EXTRA_ARGS") {
        config.extra_args = Some(value);
    }
    if let Some(value) = get("SSH_PROGRAM") {
        config.ssh_program = value;
    }
    if let Some(value) = get("PASSWORD_PROGRAM") {
        config.password_program = value;
    }
    if let Some(value) = get("COMMAND_TIMEOUT") {
        config.command_timeout = Some(Duration::from_secs(parse_secs("COMMAND_TIMEOUT", &value)?));
    }

    config.validate()?;
    Ok(config)
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    value.parse().map_err(|_| {
        ExecError::config(format!(
            "{ENV_PREFIX}_{name} must be a whole number of seconds, got {value:?}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let config = apply_with(BackendConfig::default(), |_| None).unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.ssh_program, "ssh");
    }

    #[test]
    fn overrides_apply() {
        let config = apply_with(
            BackendConfig::default(),
            lookup(&[
                ("CONNECT_TIMEOUT", "3"),
                ("SSH_PROGRAM", "/opt/bin/ssh"),
                ("EXTRA_ARGS", "-4"),
            ]),
        )
        .unwrap();

        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.ssh_program, "/opt/bin/ssh");
        assert_eq!(config.extra_args.as_deref(), Some("-4"));
    }

    #[test]
    fn empty_values_are_ignored() {
        let config = apply_with(
            BackendConfig::default(),
            lookup(&[("IDENTITY_FILE", "")]),
        )
        .unwrap();
        assert!(config.identity_file.is_none());
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = apply_with(
            BackendConfig::default(),
            lookup(&[("CONNECT_TIMEOUT", "soon")]),
        )
        .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("SSH_EXEC_CONNECT_TIMEOUT"));
    }

    #[test]
    fn rejects_zero_override() {
        assert!(
            apply_with(
                BackendConfig::default(),
                lookup(&[("CONNECT_TIMEOUT", "0")]),
            )
            .is_err()
        );
    }
}
