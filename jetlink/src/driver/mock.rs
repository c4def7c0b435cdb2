//! Scripted transport double for driver tests.
//!
//! The handshake logic is pure sequencing over the [`Transport`] seam, so
//! tests script the device side: chunks queued with `push_read` are
//! available immediately, and each `on_write_reply` chunk is released by
//! the next write, whatever it is. Written bytes are recorded for
//! assertions on command order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;

use secrecy::SecretString;

use crate::driver::Connection;
use crate::error::Result;
use crate::profile;
use crate::transport::{
    AuthMethod, ConnectConfig, HostKeyVerification, Transport, TransportKind,
};

/// A [`Connection`] wired to `mock`, configured for fast failure: tiny
/// read budget, zero delay factor, few login loops.
pub(crate) fn test_connection(mock: MockTransport) -> Connection {
    let config = ConnectConfig {
        host: "switch.lab".to_string(),
        port: 23,
        username: "admin".to_string(),
        auth: AuthMethod::Password(SecretString::from("login-pass".to_string())),
        transport: TransportKind::Telnet,
        timeout: std::time::Duration::from_millis(200),
        global_delay_factor: 0.0,
        login_max_loops: 4,
        terminal_width: 511,
        terminal_height: 24,
        host_key_verification: HostKeyVerification::Disabled,
        known_hosts_path: None,
        allow_legacy_dsa: false,
    };
    let mut conn = Connection::new(
        config,
        profile::jetstream(),
        Some(SecretString::from("enable-pass".to_string())),
    );
    conn.attach(Box::new(mock));
    conn
}

pub(crate) struct MockTransport {
    reads: Arc<Mutex<VecDeque<Bytes>>>,
    script: Mutex<VecDeque<Bytes>>,
    writes: Arc<Mutex<Vec<String>>>,
    notify: Arc<Notify>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            reads: Arc::new(Mutex::new(VecDeque::new())),
            script: Mutex::new(VecDeque::new()),
            writes: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Queue a chunk that is readable immediately (e.g. a login banner).
    pub(crate) fn push_read(self, chunk: &str) -> Self {
        self.reads
            .lock()
            .unwrap()
            .push_back(Bytes::copy_from_slice(chunk.as_bytes()));
        self
    }

    /// Queue a chunk released by the next write, in FIFO order.
    pub(crate) fn on_write_reply(self, chunk: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Bytes::copy_from_slice(chunk.as_bytes()));
        self
    }

    /// Handle to the recorded writes (lossy UTF-8).
    pub(crate) fn writes(&self) -> Arc<Mutex<Vec<String>>> {
        self.writes.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(data).into_owned());

        if let Some(reply) = self.script.lock().unwrap().pop_front() {
            self.reads.lock().unwrap().push_back(reply);
            self.notify.notify_one();
        }
        Ok(())
    }

    async fn read(&mut self) -> Result<Bytes> {
        loop {
            let notified = self.notify.notified();
            if let Some(chunk) = self.reads.lock().unwrap().pop_front() {
                return Ok(chunk);
            }
            // Block until a write releases the next scripted chunk. A
            // scriptless mock therefore looks like a silent device and
            // exercises the timeout paths.
            notified.await;
        }
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
