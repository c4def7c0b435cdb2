//! Telnet login handshake.
//!
//! SSH authenticates inside the protocol, but over Telnet the device runs
//! an interactive `User:`/`Password:` exchange on the data stream, so the
//! driver answers it before the session line is usable. The loop is
//! iteration-bounded; a quiet device gets nudged with the line terminator.

use log::debug;
use secrecy::ExposeSecret;

use super::connection::Connection;
use crate::error::{DriverError, Result, TransportError};
use crate::transport::AuthMethod;

impl Connection {
    /// Answer the interactive login exchange until the device shows a
    /// command prompt. Returns the accumulated login output.
    pub(crate) async fn telnet_login(&mut self) -> Result<String> {
        let username = self.config.username.clone();
        let password = match &self.config.auth {
            AuthMethod::Password(password) => password.expose_secret().to_string(),
            _ => String::new(),
        };

        let session = self.session.as_mut().ok_or(DriverError::NotConnected)?;
        let delay_factor = session.select_delay_factor(0.0);
        let mut output = String::new();

        for _ in 0..self.config.login_max_loops {
            let chunk = session.read_channel().await?;
            if !chunk.is_empty() {
                output.push_str(&chunk);
            }

            if self.profile.username_pattern.is_match(chunk.as_bytes()) {
                session.write_command(&username).await?;
                session.sleep_for(0.5 * delay_factor).await;
                continue;
            }
            if self.profile.password_pattern.is_match(chunk.as_bytes()) {
                session.write_command(&password).await?;
                session.sleep_for(0.5 * delay_factor).await;
                continue;
            }
            if self.prompt_pattern.is_match(output.as_bytes()) {
                debug!("telnet login complete");
                return Ok(output);
            }

            // No prompt yet; nudge the device and try again.
            session.write_command("").await?;
            session.sleep_for(0.5 * delay_factor).await;
        }

        Err(TransportError::AuthenticationFailed { user: username }.into())
    }
}

#[cfg(test)]
mod tests {
    use crate::driver::mock::{MockTransport, test_connection};
    use crate::error::{Error, TransportError};

    #[tokio::test]
    async fn test_telnet_login_answers_prompts() {
        let mock = MockTransport::new()
            .push_read("\r\nUser:")
            .on_write_reply("\r\nPassword:")
            .on_write_reply("\r\nSwitch>");
        let writes = mock.writes();
        let mut conn = test_connection(mock);

        let output = conn.telnet_login().await.unwrap();
        assert!(output.contains("Switch>"));
        assert_eq!(
            writes.lock().unwrap().as_slice(),
            ["admin\r\n", "login-pass\r\n"]
        );
    }

    #[tokio::test]
    async fn test_telnet_login_gives_up_on_silent_device() {
        let mock = MockTransport::new();
        let mut conn = test_connection(mock);

        let err = conn.telnet_login().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::AuthenticationFailed { .. })
        ));
    }
}
