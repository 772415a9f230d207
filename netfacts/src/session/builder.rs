//! Builder for connecting sessions over SSH.

use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};
use secrecy::SecretString;

use super::Session;
use crate::channel::ChannelConfig;
use crate::error::{ConfigError, ConnectError, Result};
use crate::family::{DeviceFamily, FamilyRegistry};
use crate::transport::{AuthMethod, HostKeyVerification, SshConfig, SshShell, SshTransport};

/// Builder for SSH sessions.
///
/// # Example
///
/// ```rust,no_run
/// use netfacts::SessionBuilder;
///
/// # async fn example() -> Result<(), netfacts::Error> {
/// let mut session = SessionBuilder::new("192.168.1.1")
///     .device_type("cisco_ios")
///     .username("admin")
///     .password("secret")
///     .connect()
///     .await?;
///
/// let result = session.run("show clock").await;
/// println!("{}", result);
/// session.disconnect().await.ok();
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: Option<AuthMethod>,
    device_type: Option<String>,
    custom_family: Option<DeviceFamily>,
    registry: Option<FamilyRegistry>,
    timeout: Duration,
    command_timeout: Option<Duration>,
    terminal_width: u32,
    terminal_height: u32,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    channel: ChannelConfig,
}

impl SessionBuilder {
    /// Create a builder for the given host (hostname or IP address).
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: None,
            device_type: None,
            custom_family: None,
            registry: None,
            timeout: Duration::from_secs(30),
            command_timeout: None,
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            channel: ChannelConfig::default(),
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Use password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = Some(AuthMethod::Password(SecretString::from(password.into())));
        self
    }

    /// Use password authentication with an already wrapped secret.
    pub fn secret_password(mut self, password: SecretString) -> Self {
        self.auth = Some(AuthMethod::Password(password));
        self
    }

    /// Use private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = Some(AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        });
        self
    }

    /// Device family tag (e.g. "cisco_ios"), looked up in the registry.
    pub fn device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = Some(device_type.into());
        self
    }

    /// Use a custom family definition instead of a registry lookup.
    pub fn family(mut self, family: DeviceFamily) -> Self {
        self.custom_family = Some(family);
        self
    }

    /// Registry used to resolve [`device_type`](Self::device_type).
    /// Defaults to [`FamilyRegistry::builtin`].
    pub fn registry(mut self, registry: FamilyRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Bound on connect, authentication and the first prompt (default 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bound on each command (defaults to the connect timeout).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Bytes from the end of the output searched for the prompt.
    pub fn search_depth(mut self, depth: usize) -> Self {
        self.channel.search_depth = depth;
        self
    }

    /// Validate settings and resolve the device family.
    pub fn build(self) -> Result<SessionConfig> {
        let username = self.username.ok_or(ConfigError::Missing { field: "username" })?;
        let auth = self.auth.ok_or(ConfigError::Missing {
            field: "password or private key",
        })?;

        let family = match (self.custom_family, self.device_type) {
            (Some(family), _) => family,
            (None, Some(name)) => self
                .registry
                .unwrap_or_else(FamilyRegistry::builtin)
                .get(&name)?
                .clone(),
            (None, None) => return Err(ConfigError::Missing { field: "device_type" }.into()),
        };

        let ssh = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth,
            timeout: self.timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        Ok(SessionConfig {
            command_timeout: self.command_timeout.unwrap_or(ssh.timeout),
            ssh,
            family,
            channel: self.channel,
        })
    }

    /// Build and connect in one step.
    pub async fn connect(self) -> Result<Session<SshShell>> {
        Ok(self.build()?.connect().await?)
    }
}

/// Validated session settings.
#[derive(Debug)]
pub struct SessionConfig {
    pub ssh: SshConfig,
    pub family: DeviceFamily,
    pub command_timeout: Duration,
    pub channel: ChannelConfig,
}

impl SessionConfig {
    /// Make a single connection attempt and establish a session.
    pub async fn connect(&self) -> std::result::Result<Session<SshShell>, ConnectError> {
        let host = self.ssh.host.clone();
        match self.try_connect().await {
            Ok(session) => {
                info!("Successfully connected to {}", host);
                Ok(session)
            }
            Err(e) => {
                warn!("Failed to connect to {}: {}", host, e);
                Err(e)
            }
        }
    }

    async fn try_connect(&self) -> std::result::Result<Session<SshShell>, ConnectError> {
        let transport = SshTransport::connect(&self.ssh).await?;
        let shell = transport.open_shell(self.channel.clone()).await?;
        let mut session =
            Session::establish(self.ssh.host.clone(), shell, self.family.clone(), self.ssh.timeout).await?;
        session.set_timeout(self.command_timeout);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_build_resolves_family() {
        let config = SessionBuilder::new("10.0.0.1")
            .device_type("cisco_xe")
            .username("admin")
            .password("secret")
            .port(2222)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.family.name, "cisco_xe");
        assert_eq!(config.ssh.socket_addr(), "10.0.0.1:2222");
        assert_eq!(config.command_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_build_requires_username() {
        let result = SessionBuilder::new("10.0.0.1")
            .device_type("cisco_ios")
            .password("secret")
            .build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::Missing { field: "username" }))
        ));
    }

    #[test]
    fn test_build_rejects_unknown_device_type() {
        let result = SessionBuilder::new("10.0.0.1")
            .device_type("juniper_junos")
            .username("admin")
            .password("secret")
            .build();
        assert!(matches!(
            result,
            Err(Error::Connect(ConnectError::UnknownFamily { .. }))
        ));
    }

    #[test]
    fn test_custom_family_wins() {
        let family = DeviceFamily::new("lab", r"[>#]").unwrap();
        let config = SessionBuilder::new("10.0.0.1")
            .family(family)
            .device_type("cisco_ios")
            .username("admin")
            .private_key("/tmp/id_ed25519")
            .command_timeout(Duration::from_secs(90))
            .build()
            .unwrap();
        assert_eq!(config.family.name, "lab");
        assert_eq!(config.command_timeout, Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_connect_refused_is_reported() {
        // Bind and drop a listener to get a local port with nothing behind it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = SessionBuilder::new("127.0.0.1")
            .port(port)
            .device_type("cisco_ios")
            .username("admin")
            .password("secret")
            .timeout(Duration::from_secs(2))
            .connect()
            .await;

        assert!(matches!(
            result,
            Err(Error::Connect(ConnectError::Channel { .. }))
        ));
    }
}
