//! ICMP reachability through the system `ping` tool.

use std::process::Stdio;
use std::time::Duration;

use log::{debug, trace};
use tokio::process::Command;

use crate::error::ProbeError;
use crate::parse::{PingStats, parse_ping_output};

/// Options for [`probe_ping`].
#[derive(Debug, Clone)]
pub struct PingOptions {
    /// Echo requests to send (`-c`).
    pub count: u32,

    /// Per-reply wait (`-W`), rounded up to whole seconds.
    pub wait: Duration,

    /// Bound on the whole run; the child is killed when it elapses.
    pub deadline: Duration,

    /// Program to run.
    pub program: String,
}

impl Default for PingOptions {
    fn default() -> Self {
        Self {
            count: 2,
            wait: Duration::from_secs(2),
            deadline: Duration::from_secs(10),
            program: "ping".to_string(),
        }
    }
}

impl PingOptions {
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn args(&self, host: &str) -> Vec<String> {
        let wait_secs = self.wait.as_secs() + u64::from(self.wait.subsec_nanos() > 0);
        vec![
            "-c".to_string(),
            self.count.to_string(),
            "-W".to_string(),
            wait_secs.max(1).to_string(),
            host.to_string(),
        ]
    }
}

/// Outcome of a completed ping run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

impl Reachability {
    /// `up` or `down`, as printed in device status lines.
    pub fn status(self) -> &'static str {
        match self {
            Self::Reachable => "up",
            Self::Unreachable => "down",
        }
    }
}

/// Result of [`probe_ping`].
#[derive(Debug, Clone)]
pub struct PingReport {
    pub host: String,
    pub reachability: Reachability,
    /// Parsed summary; `None` when the host did not answer.
    pub stats: Option<PingStats>,
    /// Raw stdout of the tool.
    pub output: String,
}

impl PingReport {
    pub fn is_reachable(&self) -> bool {
        self.reachability == Reachability::Reachable
    }

    /// Report lines: the statistics that were found, or a single
    /// unreachable line.
    pub fn report_lines(&self) -> Vec<String> {
        match (&self.reachability, &self.stats) {
            (Reachability::Reachable, Some(stats)) => stats.report_lines(),
            (Reachability::Reachable, None) => Vec::new(),
            (Reachability::Unreachable, _) => vec![format!("{} is unreachable", self.host)],
        }
    }
}

/// Map a `ping` exit code to reachability.
///
/// `ping` exits 0 when replies arrived and 1 when none did; anything else
/// (including death by signal) is a tool failure.
pub fn classify_exit(code: Option<i32>) -> Option<Reachability> {
    match code {
        Some(0) => Some(Reachability::Reachable),
        Some(1) => Some(Reachability::Unreachable),
        _ => None,
    }
}

/// Ping `host` and parse the summary.
pub async fn probe_ping(host: &str, options: &PingOptions) -> Result<PingReport, ProbeError> {
    let args = options.args(host);
    debug!("probe: {} {}", options.program, args.join(" "));

    let child = Command::new(&options.program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProbeError::Unavailable {
            message: format!("{}: {}", options.program, e),
        })?;

    // Dropping the timed-out future drops the child, which kills it.
    let output = tokio::time::timeout(options.deadline, child.wait_with_output())
        .await
        .map_err(|_| ProbeError::Timeout {
            host: host.to_string(),
            timeout: options.deadline,
        })?
        .map_err(|e| ProbeError::Unavailable {
            message: format!("{}: {}", options.program, e),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    trace!("probe: ping output {:?}", stdout);

    let reachability = classify_exit(output.status.code()).ok_or_else(|| {
        let stderr = String::from_utf8_lossy(&output.stderr);
        ProbeError::Unavailable {
            message: format!("{} exited with {}: {}", options.program, output.status, stderr.trim()),
        }
    })?;

    let stats = match reachability {
        Reachability::Reachable => Some(parse_ping_output(&stdout)),
        Reachability::Unreachable => None,
    };

    debug!("probe: {} is {}", host, reachability.status());
    Ok(PingReport {
        host: host.to_string(),
        reachability,
        stats,
        output: stdout,
    })
}
