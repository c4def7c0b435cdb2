//! Connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Which transport carries the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Ssh,
    Telnet,
}

impl TransportKind {
    /// Default TCP port for this transport.
    pub fn default_port(self) -> u16 {
        match self {
            TransportKind::Ssh => 22,
            TransportKind::Telnet => 23,
        }
    }
}

/// Host key verification mode, analogous to OpenSSH's
/// `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys. Connection fails if the host
    /// is not already in known_hosts.
    Strict,

    /// Accept and auto-learn unknown keys, but reject changed keys.
    /// This is the default and matches common SSH client behavior.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. For testing and lab use only.
    Disabled,
}

/// Authentication method.
#[derive(Debug, Clone, Deserialize)]
pub enum AuthMethod {
    /// No authentication (for testing only).
    None,

    /// Password authentication. Also used as the Telnet login password.
    Password(SecretString),

    /// Private key authentication (SSH only).
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },
}

/// Settings for one device connection.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Authentication method.
    #[serde(default = "default_auth")]
    pub auth: AuthMethod,

    /// Transport flavor.
    #[serde(default)]
    pub transport: TransportKind,

    /// Budget for connection setup and for every pattern read.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Multiplier applied to every wait interval, for slow devices or
    /// links. 1.0 adds no extra delay.
    #[serde(default = "default_delay_factor")]
    pub global_delay_factor: f64,

    /// Upper bound on Telnet login iterations.
    #[serde(default = "default_login_max_loops")]
    pub login_max_loops: usize,

    /// Terminal width for the SSH PTY.
    #[serde(default = "default_terminal_width")]
    pub terminal_width: u32,

    /// Terminal height for the SSH PTY.
    #[serde(default = "default_terminal_height")]
    pub terminal_height: u32,

    /// Host key verification mode (SSH only).
    #[serde(default)]
    pub host_key_verification: HostKeyVerification,

    /// Path to the known_hosts file. Defaults to the user's.
    #[serde(default)]
    pub known_hosts_path: Option<PathBuf>,

    /// Accept DSA host keys whose modulus is not a FIPS-approved size.
    ///
    /// JetStream firmware (still, as of 2.0.5 Build 20200109) presents a
    /// non-compliant DSA host key that standard validation rejects. This
    /// is a deliberate, documented security relaxation scoped to this one
    /// connection; subgroup-size and generator sanity checks remain
    /// enforced. Default off.
    #[serde(default)]
    pub allow_legacy_dsa: bool,
}

fn default_auth() -> AuthMethod {
    AuthMethod::None
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_delay_factor() -> f64 {
    1.0
}

fn default_login_max_loops() -> usize {
    60
}

fn default_terminal_width() -> u32 {
    511
}

fn default_terminal_height() -> u32 {
    24
}
