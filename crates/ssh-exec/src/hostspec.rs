//! Hostspec parsing.
//!
//! A hostspec addresses a remote target as a single string:
//! `[user[:password]@]host[:port]`, with IPv6 literals in brackets
//! (`[::1]`, `user@[2001:db8::1]:2222`). It is parsed once at backend
//! construction and never mutated afterward.

use std::fmt;
use std::str::FromStr;

use crate::error::{ExecError, Result};

/// A parsed remote target.
#[derive(Clone, PartialEq, Eq)]
pub struct HostSpec {
    name: String,
    user: Option<String>,
    port: Option<u16>,
    password: Option<String>,
}

impl HostSpec {
    /// Create a hostspec for a bare hostname.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user: None,
            port: None,
            password: None,
        }
    }

    /// Set the user.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the port (1-65535).
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// The bare hostname used as the connection destination.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The user, if present.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// The port, if present.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// The password, if present.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Parse a hostspec string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the hostname is empty, a bracket
    /// is unclosed, an unbracketed host contains more than one colon, or
    /// the port is not in 1-65535.
    pub fn parse(spec: &str) -> Result<Self> {
        if spec.is_empty() {
            return Err(ExecError::config("hostspec is empty"));
        }

        let (credentials, host_part) = split_credentials(spec);

        let (user, password) = match credentials {
            Some(credentials) => match credentials.split_once(':') {
                Some((user, password)) => (non_empty(user), non_empty(password)),
                None => (non_empty(credentials), None),
            },
            None => (None, None),
        };

        let (name, port_text) = split_host_port(host_part)?;
        if name.is_empty() {
            return Err(ExecError::config(format!("hostspec {spec:?} has no hostname")));
        }

        let port = match port_text {
            Some(text) => Some(parse_port(text)?),
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            user: user.map(str::to_string),
            port,
            password: password.map(str::to_string),
        })
    }
}

/// Split off the `user[:password]@` prefix, if any.
///
/// When the host is a bracketed IPv6 literal, only text before the bracket
/// is considered for the separator, so `user@[::1]` parses correctly.
fn split_credentials(spec: &str) -> (Option<&str>, &str) {
    let search_end = spec.find('[').unwrap_or(spec.len());
    match spec[..search_end].rfind('@') {
        Some(at) => (Some(&spec[..at]), &spec[at + 1..]),
        None => (None, spec),
    }
}

fn split_host_port(host_part: &str) -> Result<(&str, Option<&str>)> {
    if let Some(rest) = host_part.strip_prefix('[') {
        let Some(close) = rest.find(']') else {
            return Err(ExecError::config(format!(
                "hostspec {host_part:?} has an unclosed bracket"
            )));
        };
        let name = &rest[..close];
        let after = &rest[close + 1..];
        if after.is_empty() {
            return Ok((name, None));
        }
        let Some(port) = after.strip_prefix(':') else {
            return Err(ExecError::config(format!(
                "unexpected {after:?} after bracketed host"
            )));
        };
        return Ok((name, Some(port)));
    }

    match host_part.rsplit_once(':') {
        Some((name, port)) => {
            if name.contains(':') {
                return Err(ExecError::config(format!(
                    "IPv6 address {host_part:?} must be bracketed"
                )));
            }
            Ok((name, Some(port)))
        }
        None => Ok((host_part, None)),
    }
}

fn parse_port(text: &str) -> Result<u16> {
    match text.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ExecError::config(format!(
            "invalid port {text:?} in hostspec (expected 1-65535)"
        ))),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

impl FromStr for HostSpec {
    type Err = ExecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(user) = &self.user {
            write!(f, "{user}@")?;
        }
        if self.name.contains(':') {
            write!(f, "[{}]", self.name)?;
        } else {
            write!(f, "{}", self.name)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

// Debug never prints the password.
impl fmt::Debug for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSpec")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
