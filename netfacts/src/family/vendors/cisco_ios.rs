//! Cisco IOS / IOS-XE family.
//!
//! User exec prompts end in `>`, privileged exec in `#`; configuration
//! submodes show up as `Router1(config-if)#`.

use crate::family::DeviceFamily;

/// Hostname characters IOS allows in a prompt, plus the config submode suffix.
const PROMPT_PATTERN: &str = r"[\w.\-@/:]+(?:\([\w.\-]+\))?[>#]";

/// Create the Cisco IOS family definition.
pub fn family() -> DeviceFamily {
    DeviceFamily::new("cisco_ios", PROMPT_PATTERN)
        .expect("IOS prompt pattern compiles")
        .with_terminators(">#")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Unknown command")
}
