//! Device inventory files.
//!
//! An inventory is a YAML list of devices:
//!
//! ```yaml
//! - hostname: core1.lab.example.net
//!   ip: 10.0.0.1
//!   type: cisco_ios
//! - hostname: edge1.lab.example.net
//!   type: cisco_xe
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// One device as written in the inventory file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RawEntry {
    hostname: String,
    #[serde(default)]
    ip: Option<String>,
    #[serde(rename = "type")]
    device_type: String,
}

/// A device from the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    /// Hostname as written, usually fully qualified.
    pub fqdn: String,
    /// First label of `fqdn`.
    pub short_hostname: String,
    pub ip: Option<String>,
    /// Device family tag.
    pub device_type: String,
}

impl InventoryEntry {
    pub fn new(fqdn: impl Into<String>, ip: Option<String>, device_type: impl Into<String>) -> Self {
        let fqdn = fqdn.into();
        let short_hostname = fqdn.split('.').next().unwrap_or_default().to_string();
        Self {
            fqdn,
            short_hostname,
            ip,
            device_type: device_type.into(),
        }
    }

    /// Address to connect to: the IP when given, otherwise the hostname.
    pub fn address(&self) -> &str {
        self.ip.as_deref().unwrap_or(&self.fqdn)
    }
}

impl From<RawEntry> for InventoryEntry {
    fn from(raw: RawEntry) -> Self {
        Self::new(raw.hostname, raw.ip, raw.device_type)
    }
}

/// Parse inventory YAML. An empty document is an empty inventory.
pub fn parse_inventory(text: &str) -> Result<Vec<InventoryEntry>, InventoryError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<RawEntry> = serde_yaml::from_str(text)?;
    Ok(raw.into_iter().map(InventoryEntry::from).collect())
}

/// Read and parse an inventory file.
pub fn load_inventory(path: impl AsRef<Path>) -> Result<Vec<InventoryEntry>, InventoryError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| InventoryError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_inventory(&text)
}
