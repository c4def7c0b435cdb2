//! Device profile: the per-family command and pattern strategy.
//!
//! All device-family quirks live in one plain struct injected into the
//! generic handshake engine. [`jetstream()`] builds the profile for TP-Link
//! JetStream switches:
//!
//! ```text
//! Switch>            user mode
//! Switch#            privileged mode (via "enable", or "enable-admin" for
//!                    accounts without the Admin role)
//! Switch(config)#    configuration mode ("configure"; leaving requires
//!                    repeated "exit" — there is no single all-the-way-out
//!                    command)
//! Switch(config-if)# nested configuration view
//! ```

use regex::bytes::Regex;

/// Commands and patterns for one device family.
///
/// The fields are deliberately data-only so a profile can describe a new
/// firmware variant without touching the handshake engine.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    /// Profile name (e.g. "tplink_jetstream").
    pub name: String,

    /// Prompt terminator in unprivileged mode.
    pub pri_prompt_terminator: char,

    /// Prompt terminator in privileged and configuration modes.
    pub alt_prompt_terminator: char,

    /// Primary privilege-escalation command.
    pub escalate_command: String,

    /// Secondary escalation command for accounts without full admin
    /// rights. Tried exactly once, after the primary command fails.
    pub escalate_fallback_command: Option<String>,

    /// Pattern announcing the escalation password prompt.
    pub escalate_prompt: Regex,

    /// Command that drops back out of privileged mode.
    pub deescalate_command: String,

    /// Command entering configuration mode.
    pub config_command: String,

    /// Command leaving one configuration level.
    pub config_exit_command: String,

    /// Substring marking a configuration-mode prompt.
    pub config_marker: String,

    /// Command disabling output paging.
    pub disable_paging_command: String,

    /// Username prompt pattern for the Telnet login handshake.
    pub username_pattern: Regex,

    /// Password prompt pattern for the Telnet login handshake.
    pub password_pattern: Regex,

    /// Line terminator appended to every command.
    pub line_terminator: String,

    /// Whether send_command verifies the command echo before reading the
    /// response. Off for devices that cannot fix their terminal width.
    pub cmd_verify: bool,
}

impl DeviceProfile {
    /// Create a profile with generic defaults; callers are expected to
    /// adjust the fields that differ from a plain `>`/`#` CLI.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pri_prompt_terminator: '>',
            alt_prompt_terminator: '#',
            escalate_command: "enable".to_string(),
            escalate_fallback_command: None,
            escalate_prompt: Regex::new(r"(?i)ssword").expect("static pattern"),
            deescalate_command: "disable".to_string(),
            config_command: "configure".to_string(),
            config_exit_command: "exit".to_string(),
            config_marker: "(config".to_string(),
            disable_paging_command: "terminal length 0".to_string(),
            username_pattern: Regex::new(r"User:").expect("static pattern"),
            password_pattern: Regex::new(r"Password:").expect("static pattern"),
            line_terminator: "\n".to_string(),
            cmd_verify: true,
        }
    }

    /// Set the fallback escalation command.
    pub fn with_escalate_fallback(mut self, command: impl Into<String>) -> Self {
        self.escalate_fallback_command = Some(command.into());
        self
    }

    /// Set the line terminator.
    pub fn with_line_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.line_terminator = terminator.into();
        self
    }

    /// Enable or disable command-echo verification.
    pub fn with_cmd_verify(mut self, verify: bool) -> Self {
        self.cmd_verify = verify;
        self
    }

    /// Pattern matching either shell-prompt terminator.
    pub fn prompt_pattern(&self) -> Regex {
        let class = format!(
            "[{}{}]",
            regex::escape(&self.pri_prompt_terminator.to_string()),
            regex::escape(&self.alt_prompt_terminator.to_string()),
        );
        Regex::new(&class).expect("terminator class")
    }

    /// Pattern matching the privileged/config prompt terminator only.
    pub fn alt_terminator_pattern(&self) -> Regex {
        Regex::new(&regex::escape(&self.alt_prompt_terminator.to_string()))
            .expect("terminator literal")
    }
}

/// Profile for TP-Link JetStream switches.
///
/// JetStream cannot adjust its terminal width, so command-echo verification
/// defaults to off, and both SSH and Telnet variants require `\r\n` line
/// termination.
pub fn jetstream() -> DeviceProfile {
    DeviceProfile::new("tplink_jetstream")
        .with_escalate_fallback("enable-admin")
        .with_line_terminator("\r\n")
        .with_cmd_verify(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jetstream_defaults() {
        let profile = jetstream();
        assert_eq!(profile.name, "tplink_jetstream");
        assert_eq!(profile.escalate_command, "enable");
        assert_eq!(
            profile.escalate_fallback_command.as_deref(),
            Some("enable-admin")
        );
        assert_eq!(profile.line_terminator, "\r\n");
        assert!(!profile.cmd_verify);
        assert_eq!(profile.config_marker, "(config");
    }

    #[test]
    fn test_prompt_pattern_matches_both_modes() {
        let pattern = jetstream().prompt_pattern();
        assert!(pattern.is_match(b"Switch>"));
        assert!(pattern.is_match(b"Switch#"));
        assert!(pattern.is_match(b"Switch(config)#"));
        assert!(!pattern.is_match(b"Switch"));
    }

    #[test]
    fn test_escalate_prompt_case_insensitive() {
        let profile = jetstream();
        assert!(profile.escalate_prompt.is_match(b"Password:"));
        assert!(profile.escalate_prompt.is_match(b"Enter password:"));
        assert!(profile.escalate_prompt.is_match(b"PASSWORD:"));
    }

    #[test]
    fn test_telnet_login_patterns() {
        let profile = jetstream();
        assert!(profile.username_pattern.is_match(b"\r\nUser:"));
        assert!(profile.password_pattern.is_match(b"\r\nPassword:"));
    }
}
