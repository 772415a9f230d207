//! Interface table parsing.
//!
//! `show ip interface brief` style output is column-positional: the name
//! occupies the first columns, the address the next block, and status /
//! protocol columns follow. Names can contain spaces on some platforms, so
//! fields are cut by character position instead of splitting on whitespace.
//!
//! ```text
//! Interface              IP-Address      OK? Method Status                Protocol
//! GigabitEthernet0/0     10.1.1.1        YES manual up                    up
//! GigabitEthernet0/1     unassigned      YES unset  administratively down down
//! ```

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::Range;

use log::{debug, warn};

use super::netmask::NetmaskTable;
use crate::error::ParseError;

/// Column positions and exclusion markers of an interface table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceLayout {
    /// Character range holding the interface name.
    pub name_columns: Range<usize>,

    /// Character range holding the IP address.
    pub address_columns: Range<usize>,

    /// Lines containing any of these are skipped (header row, unnumbered
    /// interfaces, excluded virtual interface types).
    pub exclude_markers: Vec<String>,
}

impl InterfaceLayout {
    /// Add an exclusion marker.
    pub fn with_exclude_marker(mut self, marker: impl Into<String>) -> Self {
        self.exclude_markers.push(marker.into());
        self
    }

    /// Whether `line` carries an exclusion marker.
    pub fn is_excluded(&self, line: &str) -> bool {
        self.exclude_markers.iter().any(|marker| line.contains(marker.as_str()))
    }
}

impl Default for InterfaceLayout {
    fn default() -> Self {
        Self {
            name_columns: 0..22,
            address_columns: 23..36,
            exclude_markers: vec![
                "Interface".to_string(),
                "unassigned".to_string(),
                "VirtualPortGroup".to_string(),
            ],
        }
    }
}

/// One retained line of the interface table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRow {
    pub name: String,
    pub ip_address: Option<String>,
    pub raw_line: String,
    pub issue: Option<ParseError>,
}

/// An interface with its address and prefix length resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub name: String,

    /// `None` when the address column was not a dotted-quad.
    pub ip_address: Option<String>,

    /// `None` when the interface config has no `ip address` line or the
    /// netmask is not in the table.
    pub cidr: Option<u8>,

    pub raw_line: String,

    /// Non-fatal problem found while building this record.
    pub issue: Option<ParseError>,
}

impl InterfaceRecord {
    /// Combine a table row with the interface's running configuration.
    ///
    /// `config` is `None` when the configuration could not be fetched. A row
    /// without an address never gets a prefix length.
    pub fn resolve(row: InterfaceRow, config: Option<&str>, netmasks: &NetmaskTable) -> Self {
        let mut issue = row.issue;
        let config = config.filter(|_| row.ip_address.is_some());
        let cidr = match config.and_then(extract_netmask) {
            Some(mask) => {
                let cidr = netmasks.lookup(mask);
                if cidr.is_none() {
                    debug!("interface {}: netmask {} not in table", row.name, mask);
                    issue.get_or_insert(ParseError::UnrecognizedNetmask {
                        mask: mask.to_string(),
                    });
                }
                cidr
            }
            None => None,
        };

        Self {
            name: row.name,
            ip_address: row.ip_address,
            cidr,
            raw_line: row.raw_line,
            issue,
        }
    }
}

impl fmt::Display for InterfaceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ip = self.ip_address.as_deref().unwrap_or("unknown");
        match self.cidr {
            Some(cidr) => write!(f, "{} - {}/{}", self.name, ip, cidr),
            None => write!(f, "{} - {}/unknown", self.name, ip),
        }
    }
}

/// Parse an interface table into rows, preserving source order.
///
/// Blank lines, lines with an exclusion marker and lines with an empty name
/// column produce nothing. A retained line whose address column is not a
/// dotted-quad still produces a row, with `ip_address` absent.
pub fn parse_interface_brief(output: &str, layout: &InterfaceLayout) -> Vec<InterfaceRow> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !layout.is_excluded(line))
        .filter_map(|line| parse_row(line, layout))
        .collect()
}

fn parse_row(line: &str, layout: &InterfaceLayout) -> Option<InterfaceRow> {
    let name = column(line, &layout.name_columns);
    if name.is_empty() {
        debug!("skipping line without interface name: {:?}", line);
        return None;
    }

    let address = column(line, &layout.address_columns);
    let (ip_address, issue) = match address.parse::<Ipv4Addr>() {
        Ok(_) => (Some(address), None),
        Err(_) => {
            warn!("interface {}: no address in column {:?}", name, layout.address_columns);
            (
                None,
                Some(ParseError::MalformedLine {
                    line: line.to_string(),
                }),
            )
        }
    };

    Some(InterfaceRow {
        name,
        ip_address,
        raw_line: line.to_string(),
        issue,
    })
}

/// Cut a character range out of `line`, clamped to the line length, trimmed.
pub fn column(line: &str, range: &Range<usize>) -> String {
    line.chars()
        .skip(range.start)
        .take(range.end.saturating_sub(range.start))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Netmask from the first `ip address <addr> <mask>` line of an interface
/// configuration (the fourth whitespace-separated token).
pub fn extract_netmask(config: &str) -> Option<&str> {
    config
        .lines()
        .filter(|line| line.contains("ip address"))
        .find_map(|line| line.split_whitespace().nth(3))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRIEF: &str = "\
Interface              IP-Address      OK? Method Status                Protocol
GigabitEthernet0/0     10.1.1.1        YES manual up                    up
GigabitEthernet0/1     unassigned      YES unset  administratively down down
Loopback0              192.168.255.1   YES manual up                    up
VirtualPortGroup0      192.168.35.1    YES manual up                    up
Tunnel100              172.16.0.9      YES NVRAM  up                    up
";

    fn rows() -> Vec<InterfaceRow> {
        parse_interface_brief(BRIEF, &InterfaceLayout::default())
    }

    #[test]
    fn test_column_positional_extraction() {
        let line = "GigabitEthernet0/0     10.1.1.1        YES manual up    up";
        let layout = InterfaceLayout::default();
        assert_eq!(column(line, &layout.name_columns), "GigabitEthernet0/0");
        assert_eq!(column(line, &layout.address_columns), "10.1.1.1");
    }

    #[test]
    fn test_rows_in_source_order() {
        let names: Vec<_> = rows().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["GigabitEthernet0/0", "Loopback0", "Tunnel100"]);
    }

    #[test]
    fn test_excluded_lines_never_produce_rows() {
        let layout = InterfaceLayout::default();
        for row in rows() {
            assert!(!layout.is_excluded(&row.raw_line));
        }
        assert!(rows().iter().all(|r| r.name != "GigabitEthernet0/1"));
        assert!(rows().iter().all(|r| !r.name.starts_with("VirtualPortGroup")));
    }

    #[test]
    fn test_parsing_is_repeatable() {
        assert_eq!(rows(), rows());
    }

    #[test]
    fn test_names_with_spaces() {
        let layout = InterfaceLayout::default();
        let line = "Port-channel 10         10.9.9.1        YES manual up                    up";
        let rows = parse_interface_brief(line, &layout);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Port-channel 10");
        assert_eq!(rows[0].ip_address.as_deref(), Some("10.9.9.1"));
    }

    #[test]
    fn test_malformed_line_degrades_to_absent_address() {
        let output = "\
GigabitEthernet0/0     10.1.1.1        YES manual up                    up
Dialer1                negotiated      YES IPCP   up                    up
Serial0
Loopback0              192.168.255.1   YES manual up                    up
";
        let rows = parse_interface_brief(output, &InterfaceLayout::default());
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].name, "Dialer1");
        assert_eq!(rows[1].ip_address, None);
        assert!(matches!(rows[1].issue, Some(ParseError::MalformedLine { .. })));
        assert_eq!(rows[2].name, "Serial0");
        assert_eq!(rows[2].ip_address, None);
        assert_eq!(rows[3].ip_address.as_deref(), Some("192.168.255.1"));
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let output = "\r\nLoopback0              192.168.255.1   YES manual up   up\r\n\r\n";
        let rows = parse_interface_brief(output, &InterfaceLayout::default());
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].raw_line.ends_with('\r'));
    }

    #[test]
    fn test_custom_marker() {
        let layout = InterfaceLayout::default().with_exclude_marker("Tunnel");
        let names: Vec<_> = parse_interface_brief(BRIEF, &layout)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["GigabitEthernet0/0", "Loopback0"]);
    }

    #[test]
    fn test_extract_netmask() {
        let config = "\
Building configuration...

Current configuration : 96 bytes
!
interface GigabitEthernet0/0
 description uplink
 ip address 10.1.1.1 255.255.255.0
 negotiation auto
end";
        assert_eq!(extract_netmask(config), Some("255.255.255.0"));
        assert_eq!(extract_netmask("interface Loopback0\n no ip address\nend"), None);
        assert_eq!(extract_netmask(""), None);
    }

    #[test]
    fn test_resolve_with_known_mask() {
        let row = rows().remove(0);
        let record = InterfaceRecord::resolve(
            row,
            Some(" ip address 10.1.1.1 255.255.255.0"),
            &NetmaskTable::default(),
        );
        assert_eq!(record.cidr, Some(24));
        assert_eq!(record.issue, None);
        assert_eq!(record.to_string(), "GigabitEthernet0/0 - 10.1.1.1/24");
    }

    #[test]
    fn test_resolve_with_unknown_mask() {
        let row = rows().remove(1);
        let record = InterfaceRecord::resolve(
            row,
            Some(" ip address 192.168.255.1 255.255.0.0"),
            &NetmaskTable::default(),
        );
        assert_eq!(record.cidr, None);
        assert_eq!(
            record.issue,
            Some(ParseError::UnrecognizedNetmask {
                mask: "255.255.0.0".to_string()
            })
        );
        assert_eq!(record.to_string(), "Loopback0 - 192.168.255.1/unknown");
    }

    #[test]
    fn test_resolve_without_ip_address_line() {
        let mut all = rows();
        let first = InterfaceRecord::resolve(
            all.remove(0),
            Some(" ip address 10.1.1.1 255.255.255.0"),
            &NetmaskTable::default(),
        );
        // A record without an address line must not inherit the previous mask.
        let second = InterfaceRecord::resolve(
            all.remove(0),
            Some("interface Loopback0\n no ip address"),
            &NetmaskTable::default(),
        );
        assert_eq!(first.cidr, Some(24));
        assert_eq!(second.cidr, None);
        assert_eq!(second.issue, None);

        let third = InterfaceRecord::resolve(all.remove(0), None, &NetmaskTable::default());
        assert_eq!(third.cidr, None);
    }

    #[test]
    fn test_malformed_row_has_no_prefix() {
        let mut rows = parse_interface_brief("Serial0", &InterfaceLayout::default());
        assert_eq!(rows.len(), 1);

        let record = InterfaceRecord::resolve(
            rows.remove(0),
            Some(" ip address 10.9.9.1 255.255.255.0"),
            &NetmaskTable::default(),
        );
        assert_eq!(record.ip_address, None);
        assert_eq!(record.cidr, None);
        assert!(matches!(record.issue, Some(ParseError::MalformedLine { .. })));
        assert_eq!(record.to_string(), "Serial0 - unknown/unknown");
    }
}
