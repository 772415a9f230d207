//! Connection settings read from the environment.
//!
//! Variables are read once into [`Credentials`]; nothing else in the crate
//! looks at the process environment.

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;
use crate::inventory::InventoryEntry;
use crate::session::SessionBuilder;

pub const HOST_VAR: &str = "HOST";
pub const DEVICE_TYPE_VAR: &str = "DEVICE_TYPE";
pub const USERNAME_VAR: &str = "USERNAME";
pub const PASSWORD_VAR: &str = "PASSWORD";
pub const INVENTORY_VAR: &str = "INVENTORY";

/// Target device and login.
#[derive(Debug)]
pub struct Credentials {
    pub host: String,
    pub device_type: String,
    pub username: String,
    pub password: SecretString,
    /// Inventory file, when `INVENTORY` is set.
    pub inventory: Option<PathBuf>,
}

impl Credentials {
    /// Read `HOST`, `DEVICE_TYPE`, `USERNAME`, `PASSWORD` and optionally
    /// `INVENTORY` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the same variables through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| ConfigError::MissingEnv {
                name: name.to_string(),
            })
        };

        Ok(Self {
            host: require(HOST_VAR)?,
            device_type: require(DEVICE_TYPE_VAR)?,
            username: require(USERNAME_VAR)?,
            password: SecretString::from(require(PASSWORD_VAR)?),
            inventory: get(INVENTORY_VAR).map(PathBuf::from),
        })
    }

    /// Builder for the configured host.
    pub fn session_builder(&self) -> SessionBuilder {
        self.builder_for(&self.host, &self.device_type)
    }

    /// Builder for an inventory device, using these login credentials.
    pub fn session_builder_for(&self, entry: &InventoryEntry) -> SessionBuilder {
        self.builder_for(entry.address(), &entry.device_type)
    }

    fn builder_for(&self, host: &str, device_type: &str) -> SessionBuilder {
        SessionBuilder::new(host)
            .device_type(device_type)
            .username(&self.username)
            .secret_password(SecretString::from(self.password.expose_secret().to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let creds = Credentials::from_lookup(lookup(&[
            ("HOST", "10.0.0.1"),
            ("DEVICE_TYPE", "cisco_ios"),
            ("USERNAME", "admin"),
            ("PASSWORD", "secret"),
        ]))
        .unwrap();

        assert_eq!(creds.host, "10.0.0.1");
        assert_eq!(creds.device_type, "cisco_ios");
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password.expose_secret(), "secret");
        assert_eq!(creds.inventory, None);
    }

    #[test]
    fn test_missing_variable() {
        let err = Credentials::from_lookup(lookup(&[
            ("HOST", "10.0.0.1"),
            ("DEVICE_TYPE", "cisco_ios"),
            ("USERNAME", ""),
            ("PASSWORD", "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv { ref name } if name == "USERNAME"));
    }

    #[test]
    fn test_password_not_in_debug() {
        let creds = Credentials::from_lookup(lookup(&[
            ("HOST", "10.0.0.1"),
            ("DEVICE_TYPE", "cisco_ios"),
            ("USERNAME", "admin"),
            ("PASSWORD", "hunter2"),
            ("INVENTORY", "inventory.yaml"),
        ]))
        .unwrap();
        assert!(!format!("{:?}", creds).contains("hunter2"));
        assert_eq!(creds.inventory, Some(PathBuf::from("inventory.yaml")));
    }

    #[test]
    fn test_builder_for_inventory_entry() {
        let creds = Credentials::from_lookup(lookup(&[
            ("HOST", "10.0.0.1"),
            ("DEVICE_TYPE", "cisco_ios"),
            ("USERNAME", "admin"),
            ("PASSWORD", "secret"),
        ]))
        .unwrap();
        let entry = InventoryEntry::new("edge1.lab", Some("10.0.0.9".to_string()), "cisco_xe");

        let config = creds.session_builder_for(&entry).build().unwrap();
        assert_eq!(config.ssh.host, "10.0.0.9");
        assert_eq!(config.family.name, "cisco_xe");

        let config = creds.session_builder().build().unwrap();
        assert_eq!(config.ssh.host, "10.0.0.1");
        assert_eq!(config.family.name, "cisco_ios");
    }
}
