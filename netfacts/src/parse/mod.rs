//! Parsers turning device and probe text output into structured values.
//!
//! All parsers are pure functions over text: they never fail on odd input,
//! they leave fields empty and record a [`ParseError`](crate::error::ParseError)
//! where it helps the caller.

pub mod interfaces;
pub mod netmask;
pub mod ping;
pub mod serial;

pub use interfaces::{
    InterfaceLayout, InterfaceRecord, InterfaceRow, column, extract_netmask, parse_interface_brief,
};
pub use netmask::{NetmaskTable, netmask_to_cidr};
pub use ping::{PingStats, parse_ping_output};
pub use serial::{FixedOffsetSerial, SerialExtractor};
