//! Command-line construction for the SSH client.
//!
//! Builds the exact argument vector for the local client process from a
//! host, a configuration and a remote command string. Every interpolated
//! value (password, config path, user, port, identity file, control path,
//! destination, command) is its own argv element; nothing is ever joined
//! into a shell-interpreted string, so no field can inject arguments.

use std::fmt;

use crate::config::BackendConfig;
use crate::hostspec::HostSpec;
use crate::quote;

/// A built command line, ready for process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// The program to spawn.
    pub program: String,

    /// The program's arguments.
    pub args: Vec<String>,
}

impl CommandLine {
    /// The full argument vector, program included.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote::sh_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote::sh_quote(arg))?;
        }
        Ok(())
    }
}

/// Build the client command line for one invocation.
///
/// With a password on the host, the program is the password-injection
/// helper, which takes the password as its first argument and execs the
/// real client with the rest; the client itself refuses non-interactive
/// password input. Flags follow in a fixed order, each appended only when
/// its configuration value is present, and `extra_args` can pre-empt the
/// builder's own `ConnectTimeout`, `ControlMaster` and `ControlPath`
/// options (matched case-insensitively). The destination and the remote
/// command are always the last two arguments.
#[must_use]
pub fn build(host: &HostSpec, config: &BackendConfig, remote_command: &str) -> CommandLine {
    let mut argv: Vec<String> = Vec::new();

    if let Some(password) = host.password() {
        argv.push(config.password_program.clone());
        argv.push(password.to_string());
    }
    argv.push(config.ssh_program.clone());

    let extra = config.extra_args.as_deref().unwrap_or("");
    let extra_lower = extra.to_lowercase();
    argv.extend(quote::split_words(extra));

    if let Some(path) = &config.ssh_config {
        argv.push("-F".to_string());
        argv.push(path.display().to_string());
    }
    if let Some(user) = host.user() {
        argv.push("-o".to_string());
        argv.push(format!("User={user}"));
    }
    if let Some(port) = host.port() {
        argv.push("-o".to_string());
        argv.push(format!("Port={port}"));
    }
    if let Some(path) = &config.identity_file {
        argv.push("-i".to_string());
        argv.push(path.display().to_string());
    }

    if !extra_lower.contains("connecttimeout") {
        argv.push("-o".to_string());
        argv.push(format!("ConnectTimeout={}", config.connect_timeout.as_secs()));
    }

    let mut multiplexing = false;
    if !config.control_persist.is_zero() && !extra_lower.contains("controlmaster") {
        multiplexing = true;
        argv.push("-o".to_string());
        argv.push("ControlMaster=auto".to_string());
        argv.push("-o".to_string());
        argv.push(format!("ControlPersist={}s", config.control_persist.as_secs()));
    }
    if multiplexing
        && let Some(path) = &config.control_path
        && !extra_lower.contains("controlpath")
    {
        argv.push("-o".to_string());
        argv.push(format!("ControlPath={path}"));
    }

    argv.push(host.name().to_string());
    argv.push(remote_command.to_string());

    let program = argv.remove(0);
    CommandLine {
        program,
        args: argv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_host() -> HostSpec {
        HostSpec::new("example.com")
    }

    #[test]
    fn plain_invocation_shape() {
        let cmdline = build(&default_host(), &BackendConfig::default(), "echo hi");
        assert_eq!(cmdline.program, "ssh");
        assert_eq!(
            cmdline.args.last().map(String::as_str),
            Some("echo hi"),
        );
        assert_eq!(
            cmdline.args[cmdline.args.len() - 2],
            "example.com",
        );
    }

    #[test]
    fn defaults_add_timeout_and_multiplexing() {
        let cmdline = build(&default_host(), &BackendConfig::default(), "true");
        let args = cmdline.args.join(" ");
        assert!(args.contains("-o ConnectTimeout=10"));
        assert!(args.contains("-o ControlMaster=auto"));
        assert!(args.contains("-o ControlPersist=60s"));
        assert!(!args.contains("ControlPath"));
    }

    #[test]
    fn flag_order_is_fixed() {
        let host = HostSpec::new("example.com").with_user("alice").with_port(2222);
        let config = BackendConfig::default()
            .ssh_config("/etc/ssh_config")
            .identity_file("/home/alice/.ssh/id_ed25519");
        let cmdline = build(&host, &config, "true");

        let args = &cmdline.args;
        let position = |needle: &str| args.iter().position(|a| a == needle).unwrap();
        assert!(position("/etc/ssh_config") < position("User=alice"));
        assert!(position("User=alice") < position("Port=2222"));
        assert!(position("Port=2222") < position("/home/alice/.ssh/id_ed25519"));
        assert!(position("/home/alice/.ssh/id_ed25519") < position("ConnectTimeout=10"));
    }

    #[test]
    fn password_becomes_helper_argument() {
        let host = HostSpec::new("example.com").with_password("hunter2");
        let cmdline = build(&host, &BackendConfig::default(), "true");
        let argv = cmdline.argv();
        assert_eq!(argv[0], "sshpass");
        assert_eq!(argv[1], "hunter2");
        assert_eq!(argv[2], "ssh");
    }

    #[test]
    fn extra_args_pass_through_verbatim() {
        let config = BackendConfig::default().extra_args("-4 -o StrictHostKeyChecking=no");
        let cmdline = build(&default_host(), &config, "true");
        assert_eq!(cmdline.args[0], "-4");
        assert_eq!(cmdline.args[1], "-o");
        assert_eq!(cmdline.args[2], "StrictHostKeyChecking=no");
    }

    #[test]
    fn extra_connect_timeout_suppresses_builder_flag() {
        let config = BackendConfig::default().extra_args("-o connectTimeout=5");
        let cmdline = build(&default_host(), &config, "true");
        let args = cmdline.args.join(" ");
        assert!(args.contains("connectTimeout=5"));
        assert!(!args.contains("ConnectTimeout=10"));
    }

    #[test]
    fn extra_control_master_suppresses_multiplexing() {
        let config = BackendConfig::default()
            .control_path("/tmp/cm")
            .extra_args("-o CONTROLMASTER=no");
        let cmdline = build(&default_host(), &config, "true");
        let args = cmdline.args.join(" ");
        assert!(!args.contains("ControlMaster=auto"));
        assert!(!args.contains("ControlPersist"));
        assert!(!args.contains("ControlPath"));
    }

    #[test]
    fn zero_persist_disables_multiplexing() {
        let config = BackendConfig::default()
            .control_persist(std::time::Duration::ZERO)
            .control_path("/tmp/cm");
        let cmdline = build(&default_host(), &config, "true");
        let args = cmdline.args.join(" ");
        assert!(!args.contains("ControlMaster"));
        assert!(!args.contains("ControlPath"));
    }

    #[test]
    fn control_path_rides_on_multiplexing() {
        let config = BackendConfig::default().control_path("/tmp/cm-%r@%h:%p");
        let cmdline = build(&default_host(), &config, "true");
        assert!(cmdline.args.contains(&"ControlPath=/tmp/cm-%r@%h:%p".to_string()));
    }

    #[test]
    fn extra_control_path_suppresses_configured_one() {
        let config = BackendConfig::default()
            .control_path("/tmp/cm")
            .extra_args("-o ControlPath=/elsewhere");
        let cmdline = build(&default_host(), &config, "true");
        let args = cmdline.args.join(" ");
        assert!(args.contains("ControlPath=/elsewhere"));
        assert!(!args.contains("ControlPath=/tmp/cm"));
    }

    #[test]
    fn hostile_hostname_stays_single_argument() {
        let host = HostSpec::new("evil.com; rm -rf /");
        let cmdline = build(&host, &BackendConfig::default(), "true");
        assert!(cmdline.args.contains(&"evil.com; rm -rf /".to_string()));
    }

    #[test]
    fn display_is_shell_quoted() {
        let cmdline = build(&default_host(), &BackendConfig::default(), "echo hi");
        let rendered = cmdline.to_string();
        assert!(rendered.starts_with("ssh "));
        assert!(rendered.ends_with("example.com 'echo hi'"));
    }
}
