//! SSH transport layer wrapping russh.
//!
//! Handles TCP connect, key exchange, host key verification and
//! authentication, then opens a PTY shell that the session layer drives
//! through the [`ShellChannel`](crate::channel::ShellChannel) trait.

pub mod config;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::{SshShell, SshTransport};
