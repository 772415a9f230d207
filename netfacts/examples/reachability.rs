//! Check every device in an inventory file for reachability.
//!
//! For each device prints its status line, the ping summary and whether
//! port 443 accepts connections.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example reachability -- inventory.yaml
//! INVENTORY=inventory.yaml cargo run --example reachability
//! ```

use std::env;

use netfacts::probe::{ReachabilityOptions, check_reachability};
use netfacts::{load_inventory, report};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(path) = env::args().nth(1).or_else(|| env::var("INVENTORY").ok()) else {
        eprintln!("Usage: reachability <inventory.yaml> (or set INVENTORY)");
        std::process::exit(1);
    };

    let inventory = load_inventory(&path)?;
    let options = ReachabilityOptions::default();

    for entry in &inventory {
        println!("{}", report::separator());
        let reachability = check_reachability(entry.address(), &options).await;
        println!("{}", report::device_status_line(entry, reachability.status()));
        for line in reachability.report_lines() {
            println!("{}", line);
        }
    }

    Ok(())
}
