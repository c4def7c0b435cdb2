//! Device connection: lifecycle and command execution.

use std::time::Instant;

use log::debug;
use regex::bytes::Regex;

use super::response::Response;
use super::session::ChannelSession;
use crate::error::{ChannelError, DriverError, Result};
use crate::profile::DeviceProfile;
use crate::transport::{
    ConnectConfig, SshTransport, TelnetTransport, Transport, TransportKind,
};
use secrecy::SecretString;

/// A driver connection to one JetStream switch.
///
/// Create via [`ConnectionBuilder`](super::ConnectionBuilder), then call
/// [`open`](Connection::open). After `open` returns, the channel sits at a
/// privileged, paging-free prompt and is ready for commands.
pub struct Connection {
    pub(crate) config: ConnectConfig,
    pub(crate) profile: DeviceProfile,

    /// Privilege-escalation password.
    pub(crate) secret: Option<SecretString>,

    /// Live session; `None` until `open` succeeds.
    pub(crate) session: Option<ChannelSession>,

    /// Device prompt with the trailing `>`/`#` stripped. Set once during
    /// session preparation; stable across privilege toggles.
    pub(crate) base_prompt: String,

    /// Matches either prompt terminator, e.g. `[>#]`.
    pub(crate) prompt_pattern: Regex,

    /// Matches the privileged/config terminator, e.g. `#`.
    pub(crate) alt_terminator_pattern: Regex,

    /// Prompt pattern anchored to the base prompt once it is known.
    pub(crate) prompt_read_pattern: Regex,
}

impl Connection {
    pub(crate) fn new(
        config: ConnectConfig,
        profile: DeviceProfile,
        secret: Option<SecretString>,
    ) -> Self {
        let prompt_pattern = profile.prompt_pattern();
        let alt_terminator_pattern = profile.alt_terminator_pattern();
        Self {
            config,
            profile,
            secret,
            session: None,
            base_prompt: String::new(),
            prompt_read_pattern: prompt_pattern.clone(),
            prompt_pattern,
            alt_terminator_pattern,
        }
    }

    /// Connect the transport and bring the session to a command-ready
    /// state: login (Telnet), drain the banner, detect the base prompt,
    /// escalate privilege, disable output paging.
    pub async fn open(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        let transport: Box<dyn Transport> = match self.config.transport {
            TransportKind::Ssh => Box::new(SshTransport::connect(&self.config).await?),
            TransportKind::Telnet => Box::new(TelnetTransport::connect(&self.config).await?),
        };
        self.attach(transport);

        if self.config.transport == TransportKind::Telnet {
            self.telnet_login().await?;
        }

        self.session_preparation().await
    }

    /// Close the connection, dropping the session.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            session.close().await?;
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// The detected base prompt (empty before `open`).
    pub fn base_prompt(&self) -> &str {
        &self.base_prompt
    }

    /// Prepare a freshly connected session.
    ///
    /// Each step is a precondition for the next; any failure aborts the
    /// whole sequence and the caller should tear the connection down.
    pub(crate) async fn session_preparation(&mut self) -> Result<()> {
        debug!("session preparation: waiting out startup banner");
        let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
        let delay_factor = session.select_delay_factor(0.0);
        session.sleep_for(0.3 * delay_factor).await;
        session.clear_buffer().await?;
        session.test_channel_read(&self.prompt_pattern).await?;

        self.set_base_prompt().await?;
        self.enable().await?;
        self.disable_paging().await?;

        // Absorb the prompt redisplayed by the paging command.
        let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
        session.sleep_for(0.3 * session.global_delay_factor()).await;
        session.clear_buffer().await?;

        debug!("session preparation complete, base prompt {:?}", self.base_prompt);
        Ok(())
    }

    /// Turn off output paging so reads never stall on a `--More--` prompt.
    pub(crate) async fn disable_paging(&mut self) -> Result<String> {
        let command = self.profile.disable_paging_command.clone();
        debug!("disable paging: {command:?}");
        let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
        session.write_command(&command).await?;
        session
            .read_until_pattern(&self.alt_terminator_pattern)
            .await
    }

    /// Send a command and read until the prompt reappears.
    pub async fn send_command(&mut self, command: &str) -> Result<Response> {
        let start = Instant::now();
        let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
        session.write_command(command).await?;

        let mut raw = String::new();
        if self.profile.cmd_verify {
            let echo = Regex::new(&regex::escape(command.trim_end()))
                .map_err(ChannelError::InvalidPattern)?;
            raw.push_str(&session.read_until_pattern(&echo).await?);
        }
        raw.push_str(&session.read_until_pattern(&self.prompt_read_pattern).await?);

        let prompt = session.last_prompt().to_string();
        let output = normalize_output(&raw, command);
        Ok(Response::new(command, output, raw, prompt, start.elapsed()))
    }

    pub(crate) fn attach(&mut self, transport: Box<dyn Transport>) {
        self.session = Some(ChannelSession::new(
            transport,
            self.profile.line_terminator.clone(),
            self.config.timeout,
            self.config.global_delay_factor,
        ));
    }

    pub(crate) fn last_prompt_owned(&self) -> String {
        self.session
            .as_ref()
            .map(|s| s.last_prompt().to_string())
            .unwrap_or_default()
    }
}

/// Strip the command echo and the trailing prompt line from raw output.
fn normalize_output(raw: &str, command: &str) -> String {
    let output = raw.trim_start_matches(['\r', '\n']);
    let output = output.strip_prefix(command.trim_end()).unwrap_or(output);
    let output = output.trim_start_matches(['\r', '\n']);

    match output.rfind('\n') {
        Some(pos) => output[..pos].trim_end().to_string(),
        None => output.to_string(),
    }
}
