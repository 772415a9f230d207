//! Print a device's IP interfaces with prefix lengths.
//!
//! # Usage
//!
//! ```bash
//! HOST=10.0.0.1 DEVICE_TYPE=cisco_ios USERNAME=admin PASSWORD=secret \
//!     cargo run --example get_ip_interfaces
//! ```
//!
//! Output:
//!
//! ```text
//! ________________________________________________________________________________
//! GigabitEthernet0/0 - 10.1.1.1/24
//! Loopback0 - 192.168.255.1/32
//! ________________________________________________________________________________
//! ```

use netfacts::{Credentials, facts, report, with_session};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let credentials = Credentials::from_env()?;
    let session = credentials.session_builder().connect().await?;

    let interfaces = with_session(session, async |session| {
        Ok(facts::ip_interfaces(session).await?)
    })
    .await?;

    if !interfaces.is_empty() {
        print!("{}", report::framed(report::interface_lines(&interfaces)));
    }

    Ok(())
}
