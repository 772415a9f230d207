//! Error types for netfacts.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for netfacts operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Session establishment errors
    #[error("Connect error: {0}")]
    Connect(#[from] ConnectError),

    /// Command execution errors
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Reachability probe errors
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Invalid builder or family configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Inventory loading errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

/// Failures while establishing a session.
#[derive(Error, Debug)]
pub enum ConnectError {
    /// No response within the connect window
    #[error("Connection to {target} timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    /// Credentials rejected by the device
    #[error("Authentication failed for user '{user}' on {host}")]
    AuthenticationFailed { host: String, user: String },

    /// Any other transport or protocol failure
    #[error("Channel error on {host}: {message}")]
    Channel { host: String, message: String },

    /// Device family tag not present in the registry
    #[error("Unknown device type '{name}'")]
    UnknownFamily { name: String },

    /// Host key not in known_hosts (strict mode)
    #[error("Host key for {host}:{port} is not known")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },
}

impl ConnectError {
    /// Build a channel error from anything printable.
    pub fn channel(host: impl Into<String>, message: impl ToString) -> Self {
        Self::Channel {
            host: host.into(),
            message: message.to_string(),
        }
    }
}

/// Failures of a single command on an established session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Prompt did not reappear within the command timeout
    #[error("Command '{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// Channel closed or failed mid-command; the session is no longer usable
    #[error("Channel failed during '{command}': {message}")]
    Channel { command: String, message: String },

    /// Session was previously broken or disconnected
    #[error("Session is not usable - reconnect before sending '{command}'")]
    SessionUnusable { command: String },

    /// Device answered with one of the family's failure markers
    #[error("Device rejected '{command}': {marker}")]
    Rejected { command: String, marker: String },
}

impl CommandError {
    /// Whether the session must be disconnected after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Channel { .. } | Self::SessionUnusable { .. })
    }
}

/// Non-fatal parser findings, attached to the record they concern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A retained line had no recognizable address column
    #[error("Malformed line: '{line}'")]
    MalformedLine { line: String },

    /// Netmask not present in the netmask table
    #[error("Unrecognized netmask '{mask}'")]
    UnrecognizedNetmask { mask: String },
}

/// Reachability probe errors.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The probe tool could not be run or reported a usage/system error
    #[error("Probe tool unavailable: {message}")]
    Unavailable { message: String },

    /// The overall probe deadline elapsed
    #[error("Probe of {host} timed out after {timeout:?}")]
    Timeout { host: String, timeout: Duration },
}

/// Channel layer errors (pattern matching, stream I/O).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern not seen before the deadline
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Remote side closed the stream
    #[error("Channel closed")]
    Closed,

    /// I/O error on the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Builder and family definition errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required builder field was not provided
    #[error("Missing required setting: {field}")]
    Missing { field: &'static str },

    /// A family definition is invalid
    #[error("Invalid family definition: {message}")]
    InvalidFamily { message: String },

    /// Invalid regex pattern in a family definition
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A family with the same name is already registered
    #[error("Device type '{name}' is already registered")]
    AlreadyRegistered { name: String },

    /// Required environment variable missing
    #[error("Environment variable '{name}' is not set")]
    MissingEnv { name: String },
}

/// Inventory file errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Failed to read the inventory file
    #[error("Failed to read inventory '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Inventory contents did not deserialize
    #[error("Invalid inventory: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Result type alias using netfacts' Error.
pub type Result<T> = std::result::Result<T, Error>;
