//! Lookup of device families by tag.

use indexmap::IndexMap;

use super::DeviceFamily;
use super::vendors;
use crate::error::{ConfigError, ConnectError};

/// Registry of device families, keyed by tag.
///
/// A plain value: build one with [`FamilyRegistry::builtin`], register custom
/// families on it, and hand it to the session builder.
#[derive(Debug, Clone, Default)]
pub struct FamilyRegistry {
    families: IndexMap<String, DeviceFamily>,
}

impl FamilyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in families.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let ios = vendors::cisco_ios::family();
        registry.insert(ios.aliased("cisco_xe"));
        registry.insert(ios);
        registry
    }

    /// Register a family. Fails if the tag is taken.
    pub fn register(&mut self, family: DeviceFamily) -> Result<(), ConfigError> {
        if self.families.contains_key(&family.name) {
            return Err(ConfigError::AlreadyRegistered { name: family.name });
        }
        self.insert(family);
        Ok(())
    }

    /// Look a family up by tag.
    pub fn get(&self, name: &str) -> Result<&DeviceFamily, ConnectError> {
        self.families.get(name).ok_or_else(|| ConnectError::UnknownFamily {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.families.contains_key(name)
    }

    /// Registered tags, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    fn insert(&mut self, family: DeviceFamily) {
        self.families.insert(family.name.clone(), family);
    }
}
