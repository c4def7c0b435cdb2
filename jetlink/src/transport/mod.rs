//! Transport layer: raw byte channels over SSH or Telnet.
//!
//! The driver never touches sockets; it consumes a [`Transport`] that
//! delivers whatever bytes the device emits and accepts whatever bytes the
//! driver writes. SSH rides on russh with a PTY + shell, Telnet on a plain
//! TCP stream with minimal option negotiation.

pub mod config;
mod hostkey;
mod ssh;
mod telnet;

pub use config::{AuthMethod, ConnectConfig, HostKeyVerification, TransportKind};
pub use ssh::SshTransport;
pub use telnet::TelnetTransport;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// A live byte channel to the device.
///
/// One transport is owned by exactly one session; all operations are
/// sequential with respect to that session.
#[async_trait]
pub trait Transport: Send {
    /// Send raw bytes. Line termination is the caller's concern.
    async fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Receive the next chunk of output, blocking until data arrives.
    /// Fails with `ChannelError::Closed` once the peer is gone.
    async fn read(&mut self) -> Result<Bytes>;

    /// Tear the connection down.
    async fn close(&mut self) -> Result<()>;
}
