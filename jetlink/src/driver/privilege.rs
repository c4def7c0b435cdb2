//! Privilege escalation and de-escalation.
//!
//! JetStream firmware splits escalation across two commands: `enable` for
//! accounts with the Admin role and `enable-admin` for everyone else, and
//! nothing identifies up front which one a given account needs. The driver
//! therefore tries the primary command and falls back to the secondary
//! exactly once when the primary is refused.

use log::debug;
use secrecy::ExposeSecret;

use super::connection::Connection;
use crate::error::{ChannelError, DriverError, Error, Result};

impl Connection {
    /// Whether the last observed prompt is privileged (`#`).
    pub fn check_enable_mode(&self) -> bool {
        self.last_prompt_owned()
            .ends_with(self.profile.alt_prompt_terminator)
    }

    /// Enter privileged mode, trying the fallback escalation command once
    /// if the primary one is refused.
    pub async fn enable(&mut self) -> Result<()> {
        if self.check_enable_mode() {
            return Ok(());
        }

        let primary = self.profile.escalate_command.clone();
        let err = match self.escalate(&primary).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        if !matches!(err, Error::Driver(DriverError::AuthorizationDenied { .. })) {
            return Err(err);
        }
        let Some(fallback) = self.profile.escalate_fallback_command.clone() else {
            return Err(err);
        };

        debug!("{primary:?} refused, retrying with {fallback:?}");
        self.escalate(&fallback).await
    }

    /// Leave privileged mode.
    pub async fn exit_enable_mode(&mut self) -> Result<()> {
        if !self.check_enable_mode() {
            return Ok(());
        }
        let command = self.profile.deescalate_command.clone();
        let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
        session.write_command(&command).await?;
        session.read_until_pattern(&self.prompt_pattern).await?;
        Ok(())
    }

    /// Run one escalation command through its full exchange: command,
    /// password prompt, password, resulting prompt.
    async fn escalate(&mut self, command: &str) -> Result<()> {
        debug!("privilege escalation via {command:?}");
        let secret = self
            .secret
            .as_ref()
            .map(|s| s.expose_secret().to_string())
            .unwrap_or_default();

        let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
        session.write_command(command).await?;

        // A device that refuses the command redisplays the prompt instead
        // of asking for a password, so the pattern read times out.
        match session.read_until_pattern(&self.profile.escalate_prompt).await {
            Ok(_) => {}
            Err(Error::Channel(ChannelError::PatternTimeout(_))) => {
                return Err(DriverError::AuthorizationDenied {
                    command: command.to_string(),
                }
                .into());
            }
            Err(e) => return Err(e),
        }

        session.write_command(&secret).await?;
        session.read_until_pattern(&self.prompt_pattern).await?;
        if !session
            .last_prompt()
            .ends_with(self.profile.alt_prompt_terminator)
        {
            return Err(DriverError::AuthorizationDenied {
                command: command.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
