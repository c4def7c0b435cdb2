//! Error types for jetlink.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for jetlink operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level errors (TCP/SSH/Telnet connection, authentication)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors (pattern reads, buffered I/O)
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors (handshake, mode transitions)
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

/// Transport layer errors.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed. Raised both for a rejected SSH auth attempt
    /// and for a Telnet login loop that exhausted its retry budget.
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host key for a known host no longer matches
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host not present in known_hosts under strict verification
    #[error("Unknown host key for {host}:{port}")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key rejected by the active verification policy
    #[error("Host key rejected for {host}:{port}: {reason}")]
    HostKeyRejected {
        host: String,
        port: u16,
        reason: String,
    },

    /// known_hosts file error
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// An expected pattern never appeared within the read budget.
    /// Not retried by the channel layer; domain loops with explicit
    /// bounds live in the driver.
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// I/O error on the channel
    #[error("Channel I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Driver layer errors (handshake and mode transitions).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Connection not opened yet
    #[error("Not connected - call open() first")]
    NotConnected,

    /// Connection already opened
    #[error("Already connected")]
    AlreadyConnected,

    /// Invalid builder configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Privilege escalation was rejected. Triggers exactly one fallback
    /// attempt with the profile's secondary escalation command; a second
    /// failure is surfaced to the caller.
    #[error("Privilege escalation rejected for command '{command}'")]
    AuthorizationDenied { command: String },

    /// Could not detect a shell prompt on the channel
    #[error("Unable to detect device prompt (last read: '{last}')")]
    PromptNotFound { last: String },

    /// Entering configuration mode did not land on a config prompt
    #[error("Failed to enter configuration mode (prompt: '{prompt}')")]
    ConfigEnterFailed { prompt: String },

    /// Still inside configuration mode after the bounded exit loop.
    /// Carries the transcript of every exit attempt in order.
    #[error("Failed to exit configuration mode after {attempts} attempts")]
    ConfigExitFailed { attempts: usize, output: String },
}

/// Result type alias using jetlink's Error.
pub type Result<T> = std::result::Result<T, Error>;
