//! High-level device driver.
//!
//! [`Connection`] owns one channel session and drives the JetStream
//! handshakes over it: Telnet login, session preparation, privilege
//! escalation, and configuration-mode transitions. The device never
//! acknowledges state explicitly, so every transition is a blind write
//! followed by a bounded pattern read, with the current mode inferred from
//! the last observed prompt.

mod builder;
mod config_mode;
mod connection;
mod login;
#[cfg(test)]
pub(crate) mod mock;
mod privilege;
mod prompt;
mod response;
mod session;

pub use builder::ConnectionBuilder;
pub use connection::Connection;
pub use response::Response;
pub use session::ChannelSession;
