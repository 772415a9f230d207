//! Print a device's chassis serial number.
//!
//! # Usage
//!
//! ```bash
//! HOST=10.0.0.1 DEVICE_TYPE=cisco_ios USERNAME=admin PASSWORD=secret \
//!     cargo run --example get_serial
//! ```

use netfacts::{Credentials, facts, report, with_session};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let credentials = Credentials::from_env()?;
    let session = credentials.session_builder().connect().await?;

    let serial = with_session(session, async |session| {
        Ok(facts::serial_number(session).await?)
    })
    .await?;

    match serial {
        Some(serial) => print!("{}", report::framed([report::serial_line(&serial)])),
        None => eprintln!("No serial number found"),
    }

    Ok(())
}
