//! Device family definitions.
//!
//! A device family bundles everything that differs between vendors and OS
//! trains: how the prompt looks, what to send after login, which commands
//! produce the facts, and how their output is laid out. Sessions and parsers
//! are parameterized by a family instead of hard-coding one dialect.

mod registry;
pub mod vendors;

pub use registry::FamilyRegistry;

use std::fmt;
use std::sync::Arc;

use regex::bytes::Regex;

use crate::channel::compile_prompt_pattern;
use crate::error::ConfigError;
use crate::parse::{FixedOffsetSerial, InterfaceLayout, NetmaskTable, SerialExtractor};

/// Placeholder replaced by the interface name in
/// [`CommandSet::interface_config`].
pub const INTERFACE_PLACEHOLDER: &str = "{interface}";

/// Show commands used to collect facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSet {
    /// Interface table (`show ip interface brief`).
    pub interface_brief: String,

    /// Per-interface configuration, with [`INTERFACE_PLACEHOLDER`].
    pub interface_config: String,

    /// Version output filtered to the serial line.
    pub serial: String,
}

impl CommandSet {
    /// The interface configuration command for `interface`.
    pub fn interface_config_for(&self, interface: &str) -> String {
        self.interface_config.replace(INTERFACE_PLACEHOLDER, interface)
    }
}

impl Default for CommandSet {
    fn default() -> Self {
        Self {
            interface_brief: "show ip interface brief".to_string(),
            interface_config: format!("show running-config interface {}", INTERFACE_PLACEHOLDER),
            serial: "show version | include Processor".to_string(),
        }
    }
}

/// Definition of a device family.
#[derive(Clone)]
pub struct DeviceFamily {
    /// Family tag (e.g. "cisco_ios").
    pub name: String,

    /// Pattern matching any prompt of this family, anchored at the end.
    pub prompt_pattern: Regex,

    /// Characters a prompt ends with (e.g. `>#`).
    pub prompt_terminators: String,

    /// Appended to every command.
    pub line_terminator: String,

    /// Commands sent right after login (paging off, wide terminal).
    pub on_open_commands: Vec<String>,

    /// Output markers meaning the device rejected a command.
    pub failed_when_contains: Vec<String>,

    pub commands: CommandSet,

    pub interface_layout: InterfaceLayout,

    pub netmasks: NetmaskTable,

    pub serial: Arc<dyn SerialExtractor>,
}

impl DeviceFamily {
    /// Create a family with the given prompt pattern and default commands,
    /// layout, netmask table and serial extractor.
    pub fn new(name: impl Into<String>, prompt_pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.into(),
            prompt_pattern: compile_prompt_pattern(prompt_pattern)?,
            prompt_terminators: ">#".to_string(),
            line_terminator: "\n".to_string(),
            on_open_commands: vec![],
            failed_when_contains: vec![],
            commands: CommandSet::default(),
            interface_layout: InterfaceLayout::default(),
            netmasks: NetmaskTable::default(),
            serial: Arc::new(FixedOffsetSerial::default()),
        })
    }

    /// Set the prompt terminator characters.
    pub fn with_terminators(mut self, terminators: impl Into<String>) -> Self {
        self.prompt_terminators = terminators.into();
        self
    }

    pub fn with_line_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.line_terminator = terminator.into();
        self
    }

    /// Add a command sent right after login.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Add a failure marker.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    pub fn with_commands(mut self, commands: CommandSet) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_interface_layout(mut self, layout: InterfaceLayout) -> Self {
        self.interface_layout = layout;
        self
    }

    pub fn with_netmasks(mut self, netmasks: NetmaskTable) -> Self {
        self.netmasks = netmasks;
        self
    }

    pub fn with_serial_extractor(mut self, extractor: Arc<dyn SerialExtractor>) -> Self {
        self.serial = extractor;
        self
    }

    /// Copy of this family under another tag.
    pub fn aliased(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// First failure marker contained in `output`.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|marker| output.contains(marker.as_str()))
            .map(String::as_str)
    }
}

impl fmt::Debug for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceFamily")
            .field("name", &self.name)
            .field("prompt_pattern", &self.prompt_pattern.as_str())
            .field("prompt_terminators", &self.prompt_terminators)
            .field("on_open_commands", &self.on_open_commands)
            .field("failed_when_contains", &self.failed_when_contains)
            .field("commands", &self.commands)
            .field("interface_layout", &self.interface_layout)
            .field("netmasks", &self.netmasks)
            .field("serial", &self.serial)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_config_template() {
        let commands = CommandSet::default();
        assert_eq!(
            commands.interface_config_for("GigabitEthernet0/0"),
            "show running-config interface GigabitEthernet0/0"
        );
    }

    #[test]
    fn test_invalid_prompt_pattern() {
        assert!(matches!(
            DeviceFamily::new("broken", r"[>#"),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_detect_failure() {
        let family = DeviceFamily::new("test", r"[>#]")
            .unwrap()
            .with_failure_pattern("% Invalid input");
        assert_eq!(
            family.detect_failure("       ^\n% Invalid input detected at '^' marker."),
            Some("% Invalid input")
        );
        assert_eq!(family.detect_failure("Loopback0 is up"), None);
    }

    #[test]
    fn test_alias_keeps_definition() {
        let family = DeviceFamily::new("a", r"[>#]").unwrap().with_on_open_command("terminal length 0");
        let alias = family.aliased("b");
        assert_eq!(alias.name, "b");
        assert_eq!(alias.on_open_commands, family.on_open_commands);
    }
}
