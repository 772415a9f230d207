//! TCP port checks.

use std::fmt;
use std::io;
use std::time::Duration;

use log::debug;
use tokio::net::{TcpStream, lookup_host};
use tokio::time::Instant;

/// Default bound on resolving and connecting.
pub const DEFAULT_PORT_TIMEOUT: Duration = Duration::from_secs(2);

/// Why a port is or is not open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Open,
    /// Every resolved address refused or failed the connection.
    Refused,
    TimedOut,
    /// The name did not resolve.
    Unresolved,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Open => "open",
            Self::Refused => "refused",
            Self::TimedOut => "timed out",
            Self::Unresolved => "unresolved",
        };
        f.write_str(text)
    }
}

/// Result of [`probe_port`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortProbeResult {
    pub host: String,
    pub port: u16,
    pub open: bool,
    pub state: PortState,
    /// Last resolver or connect error, if any.
    pub detail: Option<String>,
}

impl PortProbeResult {
    fn new(host: &str, port: u16, state: PortState, detail: Option<String>) -> Self {
        Self {
            host: host.to_string(),
            port,
            open: state == PortState::Open,
            state,
            detail,
        }
    }
}

impl fmt::Display for PortProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Port {} on {} is {}", self.port, self.host, self.state)
    }
}

/// Check whether `host:port` accepts a TCP connection.
///
/// Resolution and every connect attempt share one deadline, so the call
/// never takes longer than `timeout`. The connection is closed immediately.
pub async fn probe_port(host: &str, port: u16, timeout: Duration) -> PortProbeResult {
    let deadline = Instant::now() + timeout;

    let addrs = match tokio::time::timeout_at(deadline, lookup_host((host, port))).await {
        Ok(Ok(addrs)) => addrs.collect::<Vec<_>>(),
        Ok(Err(e)) => return PortProbeResult::new(host, port, PortState::Unresolved, Some(e.to_string())),
        Err(_) => return PortProbeResult::new(host, port, PortState::TimedOut, None),
    };
    if addrs.is_empty() {
        return PortProbeResult::new(host, port, PortState::Unresolved, None);
    }

    let mut last_error: Option<io::Error> = None;
    for addr in addrs {
        match tokio::time::timeout_at(deadline, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => {
                debug!("probe: {}:{} open via {}", host, port, addr);
                return PortProbeResult::new(host, port, PortState::Open, None);
            }
            Ok(Err(e)) => {
                debug!("probe: {} refused: {}", addr, e);
                last_error = Some(e);
            }
            Err(_) => {
                debug!("probe: {}:{} timed out after {:?}", host, port, timeout);
                return PortProbeResult::new(host, port, PortState::TimedOut, last_error.map(|e| e.to_string()));
            }
        }
    }

    PortProbeResult::new(host, port, PortState::Refused, last_error.map(|e| e.to_string()))
}
