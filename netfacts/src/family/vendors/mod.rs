//! Built-in device family definitions.

pub mod cisco_ios;
