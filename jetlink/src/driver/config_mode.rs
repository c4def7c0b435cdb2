//! Configuration-mode entry and bounded exit.
//!
//! JetStream has no command that leaves configuration mode from an
//! arbitrary nesting depth; each `exit` pops a single level
//! (`(config-if)#` to `(config)#` to `#`). The exit loop is bounded so a
//! device stuck redisplaying a config prompt cannot hang the driver.

use log::debug;

use super::connection::Connection;
use super::response::Response;
use crate::error::{DriverError, Result};

/// Upper bound on single-level `exit` commands per [`Connection::exit_config_mode`]
/// call. Real nesting depth is small; hitting the bound means the device is
/// not actually leaving.
const MAX_EXIT_ATTEMPTS: usize = 12;

impl Connection {
    /// Whether the last observed prompt is a configuration-mode prompt.
    pub fn check_config_mode(&self) -> bool {
        let prompt = self.last_prompt_owned();
        prompt.contains(&self.profile.config_marker)
            && prompt.ends_with(self.profile.alt_prompt_terminator)
    }

    /// Enter configuration mode.
    pub async fn config_mode(&mut self) -> Result<String> {
        if self.check_config_mode() {
            return Ok(String::new());
        }

        let command = self.profile.config_command.clone();
        let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
        session.write_command(&command).await?;
        let output = session
            .read_until_pattern(&self.alt_terminator_pattern)
            .await?;

        if !self.check_config_mode() {
            return Err(DriverError::ConfigEnterFailed {
                prompt: self.last_prompt_owned(),
            }
            .into());
        }
        Ok(output)
    }

    /// Leave configuration mode, issuing one `exit` per remaining nesting
    /// level, at most [`MAX_EXIT_ATTEMPTS`] of them.
    pub async fn exit_config_mode(&mut self) -> Result<String> {
        let command = self.profile.config_exit_command.clone();
        let mut output = String::new();

        for attempt in 0..MAX_EXIT_ATTEMPTS {
            if !self.check_config_mode() {
                debug!("left configuration mode after {attempt} exits");
                return Ok(output);
            }
            let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
            session.write_command(&command).await?;
            output.push_str(
                &session
                    .read_until_pattern(&self.alt_terminator_pattern)
                    .await?,
            );
        }

        if self.check_config_mode() {
            debug!("still in configuration mode, transcript: {output:?}");
            return Err(DriverError::ConfigExitFailed {
                attempts: MAX_EXIT_ATTEMPTS,
                output,
            }
            .into());
        }
        Ok(output)
    }

    /// Push a batch of configuration commands: enter configuration mode,
    /// run each command, leave again. Returns the full transcript.
    pub async fn send_config_set(&mut self, commands: &[&str]) -> Result<Response> {
        let start = std::time::Instant::now();
        let mut transcript = self.config_mode().await?;

        for command in commands {
            let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
            session.write_command(command).await?;
            transcript.push_str(
                &session
                    .read_until_pattern(&self.alt_terminator_pattern)
                    .await?,
            );
        }

        transcript.push_str(&self.exit_config_mode().await?);
        let prompt = self.last_prompt_owned();
        Ok(Response::new(
            commands.join("\n"),
            transcript.clone(),
            transcript,
            prompt,
            start.elapsed(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::driver::mock::{MockTransport, test_connection};
    use crate::error::{DriverError, Error};

    #[tokio::test]
    async fn test_config_mode_round_trip() {
        let mock = MockTransport::new()
            .on_write_reply("\r\nSwitch(config)#")
            .on_write_reply("\r\nSwitch#");
        let writes = mock.writes();
        let mut conn = test_connection(mock);
        conn.session.as_mut().unwrap().prime_prompt("Switch#");

        conn.config_mode().await.unwrap();
        assert!(conn.check_config_mode());

        conn.exit_config_mode().await.unwrap();
        assert!(!conn.check_config_mode());
        assert_eq!(
            writes.lock().unwrap().as_slice(),
            ["configure\r\n", "exit\r\n"]
        );
    }

    #[tokio::test]
    async fn test_config_mode_is_idempotent() {
        let mock = MockTransport::new().on_write_reply("\r\nSwitch(config)#");
        let writes = mock.writes();
        let mut conn = test_connection(mock);
        conn.session.as_mut().unwrap().prime_prompt("Switch#");

        conn.config_mode().await.unwrap();
        conn.config_mode().await.unwrap();
        assert_eq!(writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_exit_config_mode_pops_each_nesting_level() {
        let mock = MockTransport::new()
            .on_write_reply("\r\nSwitch(config)#")
            .on_write_reply("\r\nSwitch#");
        let writes = mock.writes();
        let mut conn = test_connection(mock);
        conn.session.as_mut().unwrap().prime_prompt("Switch(config-if)#");

        conn.exit_config_mode().await.unwrap();
        assert!(!conn.check_config_mode());
        assert_eq!(writes.lock().unwrap().as_slice(), ["exit\r\n", "exit\r\n"]);
    }

    #[tokio::test]
    async fn test_exit_config_mode_gives_up_after_bound() {
        // Device keeps redisplaying a config prompt; every exchange must
        // still appear in the transcript, in order.
        let mut mock = MockTransport::new();
        for i in 1..=12 {
            mock = mock.on_write_reply(&format!("\r\nexit-{i:02}\r\nSwitch(config)#"));
        }
        let writes = mock.writes();
        let mut conn = test_connection(mock);
        conn.session.as_mut().unwrap().prime_prompt("Switch(config)#");

        let err = conn.exit_config_mode().await.unwrap_err();
        let Error::Driver(DriverError::ConfigExitFailed { attempts, output }) = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(attempts, 12);
        assert_eq!(writes.lock().unwrap().len(), 12);
        let first = output.find("exit-01").unwrap();
        let last = output.find("exit-12").unwrap();
        assert!(first < last);
    }

    #[tokio::test]
    async fn test_send_config_set() {
        let mock = MockTransport::new()
            .on_write_reply("\r\nSwitch(config)#")
            .on_write_reply("\r\nSwitch(config)#")
            .on_write_reply("\r\nSwitch(config)#")
            .on_write_reply("\r\nSwitch#");
        let writes = mock.writes();
        let mut conn = test_connection(mock);
        conn.session.as_mut().unwrap().prime_prompt("Switch#");

        let response = conn
            .send_config_set(&["vlan 100", "name staging"])
            .await
            .unwrap();

        assert!(!conn.check_config_mode());
        assert_eq!(response.prompt, "Switch#");
        assert_eq!(
            writes.lock().unwrap().as_slice(),
            [
                "configure\r\n",
                "vlan 100\r\n",
                "name staging\r\n",
                "exit\r\n"
            ]
        );
    }
}
