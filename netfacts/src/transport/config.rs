//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys.
    Strict,

    /// Accept and learn unknown keys, reject changed keys.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. Lab use only.
    Disabled,
}

/// SSH connection configuration.
#[derive(Debug)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    pub username: String,

    pub auth: AuthMethod,

    /// Bound on TCP connect, key exchange and authentication.
    pub timeout: Duration,

    /// Terminal width for the PTY. Wide enough that devices do not wrap
    /// column-formatted tables.
    pub terminal_width: u32,

    pub terminal_height: u32,

    pub host_key_verification: HostKeyVerification,

    /// Alternative known_hosts file; `~/.ssh/known_hosts` when `None`.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// `host:port` string for diagnostics.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Authentication method for SSH connections.
#[derive(Debug)]
pub enum AuthMethod {
    /// Password authentication.
    Password(SecretString),

    /// Private key authentication.
    PrivateKey {
        path: PathBuf,
        passphrase: Option<SecretString>,
    },
}
