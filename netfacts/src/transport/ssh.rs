//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use regex::bytes::Regex;
use russh::ChannelStream;
use russh::client::{self, Handle, Msg};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use secrecy::ExposeSecret;

use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::channel::{ChannelConfig, ShellChannel, StreamChannel};
use crate::error::{ChannelError, ConnectError};

type PtyStream = Pin<Box<ChannelStream<Msg>>>;

/// An authenticated SSH connection.
pub struct SshTransport {
    session: Handle<SshHandler>,
    host: String,
    terminal_width: u32,
    terminal_height: u32,
}

impl SshTransport {
    /// Connect to the SSH server and authenticate, bounded by `config.timeout`.
    pub async fn connect(config: &SshConfig) -> Result<Self, ConnectError> {
        let ssh_config = Arc::new(client_config());

        let host_key_error: Arc<Mutex<Option<ConnectError>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            host_key_verification: config.host_key_verification.clone(),
            known_hosts_path: config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        debug!("ssh: connecting to {}", config.socket_addr());

        let mut session = tokio::time::timeout(
            config.timeout,
            client::connect(ssh_config, (config.host.as_str(), config.port), handler),
        )
        .await
        .map_err(|_| ConnectError::Timeout {
            target: config.socket_addr(),
            timeout: config.timeout,
        })?
        .map_err(|e| {
            // Prefer the detailed host key error over russh's generic one.
            let stored = host_key_error.lock().ok().and_then(|mut slot| slot.take());
            stored.unwrap_or_else(|| ConnectError::channel(&config.host, e))
        })?;

        tokio::time::timeout(config.timeout, Self::authenticate(&mut session, config))
            .await
            .map_err(|_| ConnectError::Timeout {
                target: config.socket_addr(),
                timeout: config.timeout,
            })??;

        debug!("ssh: authenticated as '{}' on {}", config.username, config.host);
        Ok(Self {
            session,
            host: config.host.clone(),
            terminal_width: config.terminal_width,
            terminal_height: config.terminal_height,
        })
    }

    /// Open a PTY shell on this connection and wrap it as a shell channel.
    pub async fn open_shell(self, channel_config: ChannelConfig) -> Result<SshShell, ConnectError> {
        let host = self.host.clone();
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(|e| ConnectError::channel(&host, e))?;

        channel
            .request_pty(
                true,
                "xterm",
                self.terminal_width,
                self.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(|e| ConnectError::channel(&host, e))?;

        channel
            .request_shell(true)
            .await
            .map_err(|e| ConnectError::channel(&host, e))?;

        let stream: PtyStream = Box::pin(channel.into_stream());
        Ok(SshShell {
            channel: StreamChannel::with_config(stream, channel_config),
            transport: Some(self),
        })
    }

    async fn authenticate(
        session: &mut Handle<SshHandler>,
        config: &SshConfig,
    ) -> Result<(), ConnectError> {
        let host = config.host.as_str();
        let success = match &config.auth {
            AuthMethod::Password(password) => session
                .authenticate_password(&config.username, password.expose_secret())
                .await
                .map_err(|e| ConnectError::channel(host, e))?
                .success(),
            AuthMethod::PrivateKey { path, passphrase } => {
                let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                    .map_err(|e| ConnectError::channel(host, format!("key {}: {}", path.display(), e)))?;

                let hash_alg = session
                    .best_supported_rsa_hash()
                    .await
                    .map_err(|e| ConnectError::channel(host, e))?
                    .flatten();

                session
                    .authenticate_publickey(
                        &config.username,
                        PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                    )
                    .await
                    .map_err(|e| ConnectError::channel(host, e))?
                    .success()
            }
        };

        if !success {
            return Err(ConnectError::AuthenticationFailed {
                host: config.host.clone(),
                user: config.username.clone(),
            });
        }

        Ok(())
    }

    /// Disconnect the SSH session.
    pub async fn close(self) -> Result<(), ChannelError> {
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(|e| ChannelError::Io(std::io::Error::other(e)))
    }
}

/// Interval between SSH keepalives on an idle session.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// russh client settings.
///
/// Devices send nothing while a session sits idle between commands, so no
/// inactivity timeout is set; keepalives detect dead peers instead.
fn client_config() -> client::Config {
    client::Config {
        inactivity_timeout: None,
        keepalive_interval: Some(KEEPALIVE_INTERVAL),
        keepalive_max: 3,
        ..Default::default()
    }
}

/// Interactive shell on an SSH PTY channel.
pub struct SshShell {
    channel: StreamChannel<PtyStream>,
    transport: Option<SshTransport>,
}

impl ShellChannel for SshShell {
    async fn write(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        self.channel.write(data).await
    }

    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>, ChannelError> {
        self.channel.read_until(pattern, timeout).await
    }

    fn discard_pending(&mut self) {
        self.channel.discard_pending();
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        // Both halves are always attempted; the first error wins.
        let channel_result = self.channel.close().await;
        let transport_result = match self.transport.take() {
            Some(transport) => transport.close().await,
            None => Ok(()),
        };
        channel_result.and(transport_result)
    }

    fn is_open(&self) -> bool {
        self.channel.is_open() && self.transport.is_some()
    }
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    /// Detailed host key error surfaced by `connect`.
    host_key_error: Arc<Mutex<Option<ConnectError>>>,
}

impl SshHandler {
    /// `Ok(true)` if matched, `Ok(false)` if the host is not known.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> Result<bool, ConnectError> {
        let result = match self.known_hosts_path {
            Some(ref path) => russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, pubkey),
        };

        match result {
            Ok(matched) => Ok(matched),
            Err(russh::keys::Error::KeyChanged { line }) => Err(ConnectError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(ConnectError::channel(&self.host, format!("known_hosts: {}", e))),
        }
    }

    fn learn_host_key(&self, pubkey: &PublicKey) -> Result<(), ConnectError> {
        let result = match self.known_hosts_path {
            Some(ref path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, pubkey, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey),
        };

        result.map_err(|e| ConnectError::channel(&self.host, format!("known_hosts: {}", e)))
    }

    fn reject(&self, error: ConnectError) -> bool {
        if let Ok(mut slot) = self.host_key_error.lock() {
            *slot = Some(error);
        }
        false
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        let accepted = match self.host_key_verification {
            HostKeyVerification::Disabled => true,
            HostKeyVerification::AcceptNew => match self.check_known_hosts(server_public_key) {
                Ok(true) => true,
                Ok(false) => {
                    if let Err(e) = self.learn_host_key(server_public_key) {
                        warn!("Failed to save host key for {}: {}", self.host, e);
                    }
                    true
                }
                Err(e) => self.reject(e),
            },
            HostKeyVerification::Strict => match self.check_known_hosts(server_public_key) {
                Ok(true) => true,
                Ok(false) => self.reject(ConnectError::HostKeyUnknown {
                    host: self.host.clone(),
                    port: self.port,
                }),
                Err(e) => self.reject(e),
            },
        };
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_sessions_are_kept_open() {
        let config = client_config();
        assert_eq!(config.inactivity_timeout, None);
        assert_eq!(config.keepalive_interval, Some(KEEPALIVE_INTERVAL));
    }
}
