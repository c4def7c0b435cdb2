//! Builder for [`Connection`].

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::connection::Connection;
use crate::error::{DriverError, Result};
use crate::profile::{self, DeviceProfile};
use crate::transport::{AuthMethod, ConnectConfig, HostKeyVerification, TransportKind};

/// Fluent configuration for a device connection.
///
/// Only the host and username are required; everything else has a
/// JetStream-appropriate default. `build` is cheap and does no I/O, the
/// connection is made by [`Connection::open`].
pub struct ConnectionBuilder {
    host: String,
    port: Option<u16>,
    username: Option<String>,
    auth: AuthMethod,
    secret: Option<SecretString>,
    transport: TransportKind,
    timeout: Duration,
    global_delay_factor: f64,
    login_max_loops: usize,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    allow_legacy_dsa: bool,
    profile: Option<DeviceProfile>,
    default_enter: Option<String>,
    cmd_verify: Option<bool>,
}

impl ConnectionBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            username: None,
            auth: AuthMethod::None,
            secret: None,
            transport: TransportKind::Ssh,
            timeout: Duration::from_secs(30),
            global_delay_factor: 1.0,
            login_max_loops: 60,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            allow_legacy_dsa: false,
            profile: None,
            default_enter: None,
            cmd_verify: None,
        }
    }

    /// TCP port. Defaults to 22 for SSH and 23 for Telnet.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Login password. Also used as the privilege-escalation secret
    /// unless [`secret`](Self::secret) is set separately.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Privilege-escalation password, when it differs from the login
    /// password.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Authenticate with a private key file (SSH only).
    pub fn private_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: path.into(),
            passphrase: None,
        };
        self
    }

    /// Passphrase for an encrypted private key.
    pub fn key_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        if let AuthMethod::PrivateKey { path, .. } = self.auth {
            self.auth = AuthMethod::PrivateKey {
                path,
                passphrase: Some(SecretString::from(passphrase.into())),
            };
        }
        self
    }

    pub fn transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Shorthand for `transport(TransportKind::Telnet)`.
    pub fn telnet(self) -> Self {
        self.transport(TransportKind::Telnet)
    }

    /// Budget for connection setup and each pattern read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Multiplier applied to every wait interval, for slow devices.
    pub fn global_delay_factor(mut self, factor: f64) -> Self {
        self.global_delay_factor = factor;
        self
    }

    /// Upper bound on Telnet login iterations.
    pub fn login_max_loops(mut self, loops: usize) -> Self {
        self.login_max_loops = loops;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Accept the non-compliant DSA host keys older JetStream firmware
    /// presents. See [`ConnectConfig::allow_legacy_dsa`].
    pub fn allow_legacy_dsa(mut self, allow: bool) -> Self {
        self.allow_legacy_dsa = allow;
        self
    }

    /// Use a custom device profile instead of the JetStream one.
    pub fn profile(mut self, profile: DeviceProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Override the line terminator appended to every command.
    pub fn default_enter(mut self, terminator: impl Into<String>) -> Self {
        self.default_enter = Some(terminator.into());
        self
    }

    /// Override command-echo verification.
    pub fn cmd_verify(mut self, verify: bool) -> Self {
        self.cmd_verify = Some(verify);
        self
    }

    pub fn build(self) -> Result<Connection> {
        let username = self.username.ok_or_else(|| DriverError::InvalidConfig {
            message: "username is required".to_string(),
        })?;

        let mut profile = self.profile.unwrap_or_else(profile::jetstream);
        if let Some(terminator) = self.default_enter {
            profile = profile.with_line_terminator(terminator);
        }
        if let Some(verify) = self.cmd_verify {
            profile = profile.with_cmd_verify(verify);
        }

        // Without an explicit secret, escalation reuses the login password.
        let secret = self.secret.or_else(|| match &self.auth {
            AuthMethod::Password(password) => Some(password.clone()),
            _ => None,
        });

        let config = ConnectConfig {
            host: self.host,
            port: self.port.unwrap_or_else(|| self.transport.default_port()),
            username,
            auth: self.auth,
            transport: self.transport,
            timeout: self.timeout,
            global_delay_factor: self.global_delay_factor,
            login_max_loops: self.login_max_loops,
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
            allow_legacy_dsa: self.allow_legacy_dsa,
        };
        Ok(Connection::new(config, profile, secret))
    }
}
