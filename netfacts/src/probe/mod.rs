//! Reachability probes run from the local host: ICMP through the system
//! `ping` tool and TCP connect checks.
//!
//! Probes do not need a device session. Each one is bounded by its own
//! deadline; [`check_reachability`] runs both concurrently.

pub mod ping;
pub mod port;

use std::time::Duration;

use futures_util::future::join;

pub use ping::{PingOptions, PingReport, Reachability, classify_exit, probe_ping};
pub use port::{DEFAULT_PORT_TIMEOUT, PortProbeResult, PortState, probe_port};

use crate::error::ProbeError;

/// Options for [`check_reachability`].
#[derive(Debug, Clone)]
pub struct ReachabilityOptions {
    pub ping: PingOptions,
    pub port: u16,
    pub port_timeout: Duration,
}

impl Default for ReachabilityOptions {
    fn default() -> Self {
        Self {
            ping: PingOptions::default(),
            port: 443,
            port_timeout: DEFAULT_PORT_TIMEOUT,
        }
    }
}

impl ReachabilityOptions {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_port_timeout(mut self, timeout: Duration) -> Self {
        self.port_timeout = timeout;
        self
    }

    pub fn with_ping(mut self, ping: PingOptions) -> Self {
        self.ping = ping;
        self
    }
}

/// Ping and port results for one host.
#[derive(Debug)]
pub struct ReachabilityReport {
    pub host: String,
    pub ping: Result<PingReport, ProbeError>,
    pub port: PortProbeResult,
}

impl ReachabilityReport {
    /// A host is up when it answers either probe.
    pub fn is_up(&self) -> bool {
        self.port.open || self.ping.as_ref().is_ok_and(PingReport::is_reachable)
    }

    /// `up` or `down`.
    pub fn status(&self) -> &'static str {
        if self.is_up() { "up" } else { "down" }
    }

    /// Ping lines (or the probe error) followed by the port line.
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = match &self.ping {
            Ok(report) => report.report_lines(),
            Err(e) => vec![e.to_string()],
        };
        lines.push(self.port.to_string());
        lines
    }
}

/// Run the ping and port probes for `host` concurrently.
pub async fn check_reachability(host: &str, options: &ReachabilityOptions) -> ReachabilityReport {
    let (ping, port) = join(
        probe_ping(host, &options.ping),
        probe_port(host, options.port, options.port_timeout),
    )
    .await;

    ReachabilityReport {
        host: host.to_string(),
        ping,
        port,
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_check_reachability_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let options = ReachabilityOptions::default()
            .with_port(port)
            .with_ping(PingOptions::default().with_program("false"));
        let report = check_reachability("127.0.0.1", &options).await;

        assert!(report.port.open);
        assert_eq!(report.ping.as_ref().unwrap().reachability, Reachability::Unreachable);
        assert!(report.is_up());
        assert_eq!(
            report.report_lines(),
            [
                "127.0.0.1 is unreachable".to_string(),
                format!("Port {} on 127.0.0.1 is open", port),
            ]
        );
    }

    #[tokio::test]
    async fn test_down_when_both_probes_fail() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let options = ReachabilityOptions::default()
            .with_port(port)
            .with_port_timeout(Duration::from_millis(500))
            .with_ping(PingOptions::default().with_program("netfacts-no-such-ping"));
        let report = check_reachability("127.0.0.1", &options).await;

        assert!(!report.is_up());
        assert_eq!(report.status(), "down");
        assert!(matches!(report.ping, Err(ProbeError::Unavailable { .. })));
    }
}
