//! Low-level channel session: buffered, pattern-bounded reads and
//! terminator-aware writes over a [`Transport`].
//!
//! Every read here is bounded, either by the configured read budget or by a
//! polling interval; the handshake layers above add their own explicit
//! retry bounds on top. The session also tracks the most recently observed
//! prompt line, which the mode checks inspect without touching the channel.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use tokio::time::{Instant, sleep, timeout, timeout_at};

use crate::channel::PatternBuffer;
use crate::error::{ChannelError, Result};
use crate::transport::Transport;

/// How long a drain pass waits for further data before deciding the
/// device has gone quiet.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cap on the geometric back-off between prompt nudges, in seconds.
const MAX_NUDGE_DELAY: f64 = 8.0;

pub struct ChannelSession {
    transport: Box<dyn Transport>,
    buffer: PatternBuffer,
    last_prompt: String,
    line_terminator: String,
    read_timeout: Duration,
    global_delay_factor: f64,
}

impl ChannelSession {
    pub fn new(
        transport: Box<dyn Transport>,
        line_terminator: impl Into<String>,
        read_timeout: Duration,
        global_delay_factor: f64,
    ) -> Self {
        Self {
            transport,
            buffer: PatternBuffer::default(),
            last_prompt: String::new(),
            line_terminator: line_terminator.into(),
            read_timeout,
            global_delay_factor,
        }
    }

    /// The most recently observed prompt line.
    pub fn last_prompt(&self) -> &str {
        &self.last_prompt
    }

    pub fn global_delay_factor(&self) -> f64 {
        self.global_delay_factor
    }

    /// Pick the effective delay factor: the larger of the caller's and the
    /// session's global multiplier.
    pub fn select_delay_factor(&self, local: f64) -> f64 {
        local.max(self.global_delay_factor)
    }

    /// Sleep for `seconds` (already scaled by the caller).
    pub async fn sleep_for(&self, seconds: f64) {
        if seconds > 0.0 {
            sleep(Duration::from_secs_f64(seconds)).await;
        }
    }

    /// Send raw bytes without appending the line terminator.
    pub async fn write_channel(&mut self, data: &str) -> Result<()> {
        trace!("write_channel: {:?}", data);
        self.transport.write(data.as_bytes()).await
    }

    /// Send a command: trailing whitespace stripped, line terminator
    /// appended (`\r\n` for this device family).
    pub async fn write_command(&mut self, command: &str) -> Result<()> {
        let normalized = format!("{}{}", command.trim_end(), self.line_terminator);
        self.write_channel(&normalized).await
    }

    /// Pull whatever output is currently available and return it.
    pub async fn read_channel(&mut self) -> Result<String> {
        self.drain_available().await?;
        if self.buffer.is_empty() {
            return Ok(String::new());
        }
        let data = self.buffer.take();
        let text = String::from_utf8_lossy(&data).into_owned();
        self.note_prompt(&text);
        trace!("read_channel: {:?}", text);
        Ok(text)
    }

    /// Read until `pattern` matches the buffer tail, or fail with
    /// `ChannelError::PatternTimeout` once the read budget elapses.
    pub async fn read_until_pattern(&mut self, pattern: &Regex) -> Result<String> {
        let deadline = Instant::now() + self.read_timeout;
        loop {
            if self.buffer.tail_contains(pattern) {
                let data = self.buffer.take();
                let text = String::from_utf8_lossy(&data).into_owned();
                self.note_prompt(&text);
                trace!("read_until_pattern {:?}: {:?}", pattern.as_str(), text);
                return Ok(text);
            }

            match timeout_at(deadline, self.transport.read()).await {
                Ok(Ok(chunk)) => self.buffer.extend(&chunk),
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    return Err(ChannelError::PatternTimeout(self.read_timeout).into());
                }
            }
        }
    }

    /// Discard all currently buffered and pending output.
    pub async fn clear_buffer(&mut self) -> Result<()> {
        self.drain_available().await?;
        self.buffer.clear();
        Ok(())
    }

    /// Non-destructive check that output matching `pattern` is present.
    ///
    /// If the device is quiet, nudges it with the line terminator and backs
    /// off geometrically between attempts. The matched output stays in the
    /// buffer; only a copy is returned.
    pub async fn test_channel_read(&mut self, pattern: &Regex) -> Result<String> {
        let delay_factor = self.select_delay_factor(0.0);
        let mut nudge_delay = 0.1 * delay_factor;
        self.sleep_for(nudge_delay * 10.0).await;

        let deadline = Instant::now() + self.read_timeout;
        loop {
            self.drain_available().await?;
            if !self.buffer.is_empty() && self.buffer.tail_contains(pattern) {
                let text = self.buffer.as_str_lossy().into_owned();
                self.note_prompt(&text);
                return Ok(text);
            }

            if Instant::now() >= deadline {
                return Err(ChannelError::PatternTimeout(self.read_timeout).into());
            }

            let terminator = self.line_terminator.clone();
            self.write_channel(&terminator).await?;
            nudge_delay = (nudge_delay * 1.1).min(MAX_NUDGE_DELAY);
            self.sleep_for(nudge_delay).await;
        }
    }

    /// Close the underlying transport.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }

    #[cfg(test)]
    pub(crate) fn prime_prompt(&mut self, prompt: &str) {
        self.last_prompt = prompt.to_string();
    }

    /// Move everything the transport currently has into the buffer.
    async fn drain_available(&mut self) -> Result<()> {
        loop {
            match timeout(POLL_INTERVAL, self.transport.read()).await {
                Ok(Ok(chunk)) => self.buffer.extend(&chunk),
                Ok(Err(e)) => return Err(e),
                Err(_) => return Ok(()),
            }
        }
    }

    /// Remember the trailing prompt line of a completed read.
    fn note_prompt(&mut self, text: &str) {
        if let Some(line) = text
            .rsplit(['\n', '\r'])
            .map(str::trim)
            .find(|line| !line.is_empty())
        {
            self.last_prompt = line.to_string();
        }
    }
}
