//! Base-prompt detection.
//!
//! The device prompt is `<name><terminator>`, where the terminator flips
//! between `>` and `#` with privilege level and grows a `(config...)`
//! segment in configuration mode. The base prompt is the stable `<name>`
//! part; command reads anchor on it so that output containing a stray
//! terminator character cannot end a read early.

use log::debug;
use regex::bytes::Regex;

use super::connection::Connection;
use crate::error::{ChannelError, DriverError, Result};

impl Connection {
    /// Nudge the device with a bare line terminator and return the prompt
    /// it answers with.
    pub(crate) async fn find_prompt(&mut self) -> Result<String> {
        let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
        session.write_command("").await?;
        session.read_until_pattern(&self.prompt_pattern).await?;

        let prompt = session.last_prompt().to_string();
        if prompt.is_empty() {
            return Err(DriverError::PromptNotFound { last: prompt }.into());
        }
        debug!("find_prompt: {prompt:?}");
        Ok(prompt)
    }

    /// Detect and store the base prompt: the current prompt with exactly
    /// one trailing terminator stripped.
    ///
    /// Stripping only one character keeps a device name that itself ends
    /// in `>` or `#` intact.
    pub(crate) async fn set_base_prompt(&mut self) -> Result<&str> {
        let prompt = self.find_prompt().await?;

        let base = prompt
            .strip_suffix(self.profile.pri_prompt_terminator)
            .or_else(|| prompt.strip_suffix(self.profile.alt_prompt_terminator))
            .unwrap_or(&prompt)
            .trim();
        if base.is_empty() {
            return Err(DriverError::PromptNotFound { last: prompt }.into());
        }

        self.base_prompt = base.to_string();
        self.prompt_read_pattern = Regex::new(&format!(
            "{}[^\r\n]*[{}{}]",
            regex::escape(&self.base_prompt),
            regex::escape(&self.profile.pri_prompt_terminator.to_string()),
            regex::escape(&self.profile.alt_prompt_terminator.to_string()),
        ))
        .map_err(ChannelError::InvalidPattern)?;

        debug!("set_base_prompt: {:?}", self.base_prompt);
        Ok(&self.base_prompt)
    }
}

#[cfg(test)]
mod tests {
    use crate::driver::mock::{MockTransport, test_connection};

    #[tokio::test]
    async fn test_set_base_prompt_strips_one_terminator() {
        let mock = MockTransport::new().on_write_reply("\r\nSwitch>");
        let mut conn = test_connection(mock);

        let base = conn.set_base_prompt().await.unwrap().to_string();
        assert_eq!(base, "Switch");
    }

    #[tokio::test]
    async fn test_set_base_prompt_same_for_privileged_prompt() {
        // The base prompt must not depend on the privilege level at the
        // time of detection.
        let mock = MockTransport::new()
            .on_write_reply("\r\nSwitch>")
            .on_write_reply("\r\nSwitch#");
        let mut conn = test_connection(mock);

        conn.set_base_prompt().await.unwrap();
        let first = conn.base_prompt().to_string();
        conn.set_base_prompt().await.unwrap();
        assert_eq!(conn.base_prompt(), first);
    }

    #[tokio::test]
    async fn test_find_prompt_reports_silent_device() {
        let mock = MockTransport::new();
        let mut conn = test_connection(mock);

        assert!(conn.find_prompt().await.is_err());
    }
}
