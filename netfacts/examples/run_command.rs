//! Interactive command runner.
//!
//! Reads commands from stdin, runs each on the device and prints the output
//! between banners. Enter `x` at the continue prompt to exit.
//!
//! # Usage
//!
//! ```bash
//! HOST=10.0.0.1 DEVICE_TYPE=cisco_ios USERNAME=admin PASSWORD=secret \
//!     cargo run --example run_command
//! ```

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use netfacts::{Credentials, Session, report};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let credentials = Credentials::from_env()?;
    let mut session = credentials.session_builder().connect().await?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let outcome = repl(&mut session, &mut input).await;

    session.disconnect().await.ok();
    outcome
}

async fn repl(
    session: &mut Session,
    input: &mut Lines<BufReader<Stdin>>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let Some(command) = ask(input, "Enter command to run: ").await? else {
            return Ok(());
        };

        let command = command.trim();
        if !command.is_empty() {
            let result = session.run(command).await;
            match &result.error {
                None => print!("{}", report::framed([result.output.as_str()])),
                Some(e) => eprintln!("Error executing command: {}", e),
            }
            if !session.is_usable() {
                return Err("session is no longer usable".into());
            }
        }

        match ask(input, "Press Enter to Continue or x to exit: ").await? {
            Some(answer) if answer.trim() != "x" => continue,
            _ => return Ok(()),
        }
    }
}

async fn ask(
    input: &mut Lines<BufReader<Stdin>>,
    prompt: &str,
) -> std::io::Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    input.next_line().await
}
