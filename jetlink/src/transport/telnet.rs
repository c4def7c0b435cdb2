//! Telnet transport over a plain TCP stream.
//!
//! JetStream's Telnet service negotiates a few options after connect; this
//! transport refuses them all (RFC 854 allows a minimal NVT), strips the
//! negotiation from the data stream, and hands the driver clean bytes.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::config::ConnectConfig;
use crate::error::{ChannelError, Result, TransportError};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

/// Telnet transport wrapping a TCP stream with option filtering.
pub struct TelnetTransport {
    stream: TcpStream,
    codec: OptionFilter,
}

impl TelnetTransport {
    /// Connect to the device's Telnet service.
    pub async fn connect(config: &ConnectConfig) -> Result<Self> {
        let stream = tokio::time::timeout(
            config.timeout,
            TcpStream::connect((config.host.as_str(), config.port)),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|e| TransportError::ConnectionFailed {
            host: config.host.clone(),
            port: config.port,
            source: e,
        })?;

        stream.set_nodelay(true).map_err(TransportError::Io)?;
        debug!("telnet connected to {}:{}", config.host, config.port);

        Ok(Self {
            stream,
            codec: OptionFilter::default(),
        })
    }
}

#[async_trait]
impl super::Transport for TelnetTransport {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut escaped = BytesMut::with_capacity(data.len());
        for &byte in data {
            escaped.extend_from_slice(if byte == IAC { &[IAC, IAC] } else { std::slice::from_ref(&byte) });
        }
        self.stream
            .write_all(&escaped)
            .await
            .map_err(ChannelError::Io)?;
        Ok(())
    }

    async fn read(&mut self) -> Result<Bytes> {
        let mut raw = [0u8; 4096];
        loop {
            let n = self.stream.read(&mut raw).await.map_err(ChannelError::Io)?;
            if n == 0 {
                return Err(ChannelError::Closed.into());
            }

            let (data, replies) = self.codec.filter(&raw[..n]);
            if !replies.is_empty() {
                self.stream
                    .write_all(&replies)
                    .await
                    .map_err(ChannelError::Io)?;
            }
            // A chunk may be pure negotiation; keep reading until the
            // device sends actual output.
            if !data.is_empty() {
                return Ok(data.freeze());
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.shutdown().await.map_err(TransportError::Io)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
enum FilterState {
    #[default]
    Data,
    Command,
    Option(u8),
    Subnegotiation,
    SubnegotiationCommand,
}

/// Stateful IAC filter; state survives chunk boundaries.
#[derive(Debug, Default)]
struct OptionFilter {
    state: FilterState,
}

impl OptionFilter {
    /// Split a raw chunk into session data and the negotiation replies
    /// that refuse every offered option.
    fn filter(&mut self, chunk: &[u8]) -> (BytesMut, BytesMut) {
        let mut data = BytesMut::with_capacity(chunk.len());
        let mut replies = BytesMut::new();

        for &byte in chunk {
            self.state = match self.state {
                FilterState::Data => {
                    if byte == IAC {
                        FilterState::Command
                    } else {
                        data.extend_from_slice(&[byte]);
                        FilterState::Data
                    }
                }
                FilterState::Command => match byte {
                    IAC => {
                        // escaped 0xff data byte
                        data.extend_from_slice(&[IAC]);
                        FilterState::Data
                    }
                    DO | DONT | WILL | WONT => FilterState::Option(byte),
                    SB => FilterState::Subnegotiation,
                    _ => FilterState::Data,
                },
                FilterState::Option(command) => {
                    match command {
                        DO => replies.extend_from_slice(&[IAC, WONT, byte]),
                        WILL => replies.extend_from_slice(&[IAC, DONT, byte]),
                        _ => {}
                    }
                    FilterState::Data
                }
                FilterState::Subnegotiation => {
                    if byte == IAC {
                        FilterState::SubnegotiationCommand
                    } else {
                        FilterState::Subnegotiation
                    }
                }
                FilterState::SubnegotiationCommand => {
                    if byte == SE {
                        FilterState::Data
                    } else {
                        FilterState::Subnegotiation
                    }
                }
            };
        }

        (data, replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_data_passes_through() {
        let mut filter = OptionFilter::default();
        let (data, replies) = filter.filter(b"\r\nUser:");
        assert_eq!(&data[..], b"\r\nUser:");
        assert!(replies.is_empty());
    }

    #[test]
    fn test_do_refused_with_wont() {
        let mut filter = OptionFilter::default();
        // IAC DO ECHO(1) interleaved with login text
        let (data, replies) = filter.filter(&[IAC, DO, 1, b'U', b's', b'e', b'r', b':']);
        assert_eq!(&data[..], b"User:");
        assert_eq!(&replies[..], &[IAC, WONT, 1]);
    }

    #[test]
    fn test_will_refused_with_dont() {
        let mut filter = OptionFilter::default();
        let (data, replies) = filter.filter(&[IAC, WILL, 3]);
        assert!(data.is_empty());
        assert_eq!(&replies[..], &[IAC, DONT, 3]);
    }

    #[test]
    fn test_subnegotiation_dropped() {
        let mut filter = OptionFilter::default();
        let (data, replies) = filter.filter(&[IAC, SB, 24, 1, 2, 3, IAC, SE, b'>',]);
        assert_eq!(&data[..], b">");
        assert!(replies.is_empty());
    }

    #[test]
    fn test_escaped_iac_is_data() {
        let mut filter = OptionFilter::default();
        let (data, _) = filter.filter(&[b'a', IAC, IAC, b'b']);
        assert_eq!(&data[..], &[b'a', IAC, b'b']);
    }

    #[test]
    fn test_state_survives_chunk_boundary() {
        let mut filter = OptionFilter::default();
        let (data, replies) = filter.filter(&[IAC]);
        assert!(data.is_empty());
        assert!(replies.is_empty());

        let (data, replies) = filter.filter(&[DO, 1]);
        assert!(data.is_empty());
        assert_eq!(&replies[..], &[IAC, WONT, 1]);
    }
}
