//! Plain-text report formatting used by the command-line programs.

use crate::inventory::InventoryEntry;
use crate::parse::InterfaceRecord;

/// Width of banners and separators.
pub const REPORT_WIDTH: usize = 80;

/// `_` line framing a report section.
pub fn banner() -> String {
    "_".repeat(REPORT_WIDTH)
}

/// `-` line between inventory devices.
pub fn separator() -> String {
    "-".repeat(REPORT_WIDTH)
}

/// `lines` between two banners, newline-terminated.
pub fn framed<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let banner = banner();
    let mut out = String::new();
    out.push_str(&banner);
    out.push('\n');
    for line in lines {
        out.push_str(line.as_ref());
        out.push('\n');
    }
    out.push_str(&banner);
    out.push('\n');
    out
}

/// `name - ip/cidr` lines, in table order.
pub fn interface_lines(records: &[InterfaceRecord]) -> Vec<String> {
    records.iter().map(ToString::to_string).collect()
}

pub fn serial_line(serial: &str) -> String {
    format!("Device serial #: {}", serial)
}

/// `Device <hostname> (<ip>) is <status>`.
pub fn device_status_line(entry: &InventoryEntry, status: &str) -> String {
    format!(
        "Device {} ({}) is {}",
        entry.fqdn,
        entry.ip.as_deref().unwrap_or("unknown"),
        status
    )
}
