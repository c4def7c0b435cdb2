//! # Jetlink
//!
//! Async CLI automation for TP-Link JetStream switches over SSH and Telnet.
//!
//! JetStream switches have a handful of CLI quirks that make generic
//! screen-scraping unreliable: the terminal width cannot be adjusted (so
//! command-echo verification is off by default), lines must be terminated
//! with `\r\n` rather than a bare `\n`, accounts without the Admin role need
//! a secondary `enable-admin` escalation, and there is no single command
//! that leaves configuration mode from a nested view. Jetlink encodes those
//! quirks in a [`DeviceProfile`] and drives the login, privilege-escalation,
//! and configuration-mode handshakes through one pattern-matched state
//! machine.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jetlink::ConnectionBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), jetlink::Error> {
//!     let mut conn = ConnectionBuilder::new("192.168.0.1")
//!         .username("admin")
//!         .password("secret")
//!         .build()?;
//!
//!     // Connects, waits out the banner, detects the base prompt,
//!     // escalates privilege, and disables output paging.
//!     conn.open().await?;
//!
//!     let response = conn.send_command("show system-info").await?;
//!     println!("{}", response.output);
//!
//!     conn.send_config_set(&["vlan 10", "name lab"]).await?;
//!     conn.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod driver;
pub mod error;
pub mod profile;
pub mod transport;

// Re-export main types for convenience
pub use driver::{Connection, ConnectionBuilder, Response};
pub use error::Error;
pub use profile::DeviceProfile;
pub use transport::{AuthMethod, ConnectConfig, HostKeyVerification, TransportKind};
