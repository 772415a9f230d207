//! Dotted-quad netmask to prefix-length lookup.

use std::net::Ipv4Addr;

use indexmap::IndexMap;

/// Masks recognized out of the box.
const DEFAULT_NETMASKS: &[(&str, u8)] = &[
    ("255.255.255.0", 24),
    ("255.255.255.255", 32),
    ("255.255.255.248", 29),
];

/// Ordered netmask → CIDR prefix table.
///
/// Masks not in the table are reported as unknown (`None`) rather than
/// guessed, so a table can be restricted to the masks a deployment actually
/// uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetmaskTable {
    entries: IndexMap<String, u8>,
}

impl NetmaskTable {
    /// Table with the default masks (/24, /32, /29).
    pub fn new() -> Self {
        DEFAULT_NETMASKS
            .iter()
            .fold(Self::empty(), |table, (mask, prefix)| table.with_entry(*mask, *prefix))
    }

    /// Table with no entries.
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Table with every contiguous mask from /0 to /32.
    pub fn full() -> Self {
        (0u8..=32).fold(Self::empty(), |table, prefix| {
            let bits = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
            table.with_entry(Ipv4Addr::from(bits).to_string(), prefix)
        })
    }

    /// Add or replace an entry.
    pub fn with_entry(mut self, mask: impl Into<String>, prefix: u8) -> Self {
        self.entries.insert(mask.into(), prefix);
        self
    }

    /// Prefix length for `mask`, or `None` if the mask is not in the table.
    pub fn lookup(&self, mask: &str) -> Option<u8> {
        self.entries.get(mask.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.entries.iter().map(|(mask, prefix)| (mask.as_str(), *prefix))
    }
}

impl Default for NetmaskTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Look `mask` up in the default table.
pub fn netmask_to_cidr(mask: &str) -> Option<u8> {
    let mask = mask.trim();
    DEFAULT_NETMASKS
        .iter()
        .find(|(known, _)| *known == mask)
        .map(|(_, prefix)| *prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_masks() {
        assert_eq!(netmask_to_cidr("255.255.255.0"), Some(24));
        assert_eq!(netmask_to_cidr("255.255.255.255"), Some(32));
        assert_eq!(netmask_to_cidr("255.255.255.248"), Some(29));
    }

    #[test]
    fn test_other_masks_are_unknown() {
        for mask in ["255.255.0.0", "255.255.255.252", "0.0.0.0", "255.255.255.128"] {
            assert_eq!(netmask_to_cidr(mask), None, "{mask}");
        }
        assert_eq!(netmask_to_cidr("not-a-mask"), None);
    }

    #[test]
    fn test_table_matches_free_function() {
        let table = NetmaskTable::default();
        assert_eq!(table.len(), 3);
        for (mask, prefix) in table.iter() {
            assert_eq!(netmask_to_cidr(mask), Some(prefix));
        }
        assert_eq!(table.lookup(" 255.255.255.0 "), Some(24));
    }

    #[test]
    fn test_extending_the_table() {
        let table = NetmaskTable::new().with_entry("255.255.255.252", 30);
        assert_eq!(table.lookup("255.255.255.252"), Some(30));
        assert_eq!(table.lookup("255.255.255.0"), Some(24));
        assert_eq!(table.lookup("255.255.0.0"), None);
    }

    #[test]
    fn test_full_table() {
        let table = NetmaskTable::full();
        assert_eq!(table.len(), 33);
        assert_eq!(table.lookup("0.0.0.0"), Some(0));
        assert_eq!(table.lookup("128.0.0.0"), Some(1));
        assert_eq!(table.lookup("255.255.0.0"), Some(16));
        assert_eq!(table.lookup("255.255.255.252"), Some(30));
        assert_eq!(table.lookup("255.255.255.255"), Some(32));
        assert_eq!(table.lookup("255.0.255.0"), None);
    }
}
