//! `ping` output parsing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static PACKET_LOSS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)% packet loss").expect("packet loss pattern compiles")
});

// Linux prints `rtt min/avg/max/mdev`, BSD and macOS `round-trip min/avg/max/stddev`.
static ROUND_TRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:rtt|round-trip) min/avg/max/(?:mdev|stddev) = ([\d.]+)/([\d.]+)/([\d.]+)/([\d.]+) ms",
    )
    .expect("round-trip pattern compiles")
});

/// Statistics from a ping summary. Each field is present only if its line
/// was found in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PingStats {
    pub packet_loss_pct: Option<f64>,
    pub min_rtt_ms: Option<f64>,
    pub avg_rtt_ms: Option<f64>,
    pub max_rtt_ms: Option<f64>,
    pub stddev_rtt_ms: Option<f64>,
}

impl PingStats {
    /// Whether neither summary line was found.
    pub fn is_empty(&self) -> bool {
        self.packet_loss_pct.is_none() && self.min_rtt_ms.is_none()
    }

    /// Report lines for the fields that were found.
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);
        if let Some(loss) = self.packet_loss_pct {
            lines.push(format!("Packet loss: {}%", loss));
        }
        if let (Some(min), Some(avg), Some(max)) = (self.min_rtt_ms, self.avg_rtt_ms, self.max_rtt_ms) {
            lines.push(format!("Minimum RTT: {} ms", min));
            lines.push(format!("Average RTT: {} ms", avg));
            lines.push(format!("Maximum RTT: {} ms", max));
        }
        lines
    }
}

impl fmt::Display for PingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report_lines().join("\n"))
    }
}

/// Parse packet loss and round-trip times from `ping` output.
///
/// The two summary lines are matched independently; a missing line only
/// leaves its fields empty.
pub fn parse_ping_output(output: &str) -> PingStats {
    let mut stats = PingStats::default();

    if let Some(caps) = PACKET_LOSS.captures(output) {
        stats.packet_loss_pct = caps[1].parse().ok();
    }

    if let Some(caps) = ROUND_TRIP.captures(output) {
        let values: Vec<Option<f64>> = (1..=4).map(|i| caps[i].parse().ok()).collect();
        stats.min_rtt_ms = values[0];
        stats.avg_rtt_ms = values[1];
        stats.max_rtt_ms = values[2];
        stats.stddev_rtt_ms = values[3];
    }

    stats
}
