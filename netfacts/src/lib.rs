//! # netfacts
//!
//! Async fact collection from network devices over an SSH CLI.
//!
//! netfacts logs into a device's interactive shell, synchronizes on its
//! prompt, runs show commands and parses the column-formatted output into
//! typed records: IP interfaces with prefix lengths, the chassis serial
//! number. It also checks device reachability from the local host with
//! `ping` and TCP port probes.
//!
//! ## Features
//!
//! - Async SSH sessions via russh, one command in flight per session
//! - Prompt detection with an exact per-device prompt pattern
//! - Device families as data (prompt, commands, column layout, netmasks)
//! - Pure parsers for interface tables, serial numbers and ping summaries
//! - YAML inventories and environment-based credentials
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netfacts::{SessionBuilder, facts, with_session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netfacts::Error> {
//!     let session = SessionBuilder::new("192.168.1.1")
//!         .device_type("cisco_ios")
//!         .username("admin")
//!         .password("secret")
//!         .connect()
//!         .await?;
//!
//!     let interfaces = with_session(session, async |session| {
//!         Ok(facts::ip_interfaces(session).await?)
//!     })
//!     .await?;
//!
//!     for interface in interfaces {
//!         println!("{}", interface);
//!     }
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod facts;
pub mod family;
pub mod inventory;
pub mod parse;
pub mod probe;
pub mod report;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use config::Credentials;
pub use error::{CommandError, ConnectError, Error, Result};
pub use family::{DeviceFamily, FamilyRegistry};
pub use inventory::{InventoryEntry, load_inventory};
pub use parse::{InterfaceRecord, NetmaskTable, PingStats};
pub use session::{CommandResult, Session, SessionBuilder, SessionConfig, SessionState, with_session};
pub use transport::{AuthMethod, SshConfig};
