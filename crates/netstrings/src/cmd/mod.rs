use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod echo;
pub mod relay;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Echo raw bytes back to each client, optionally splitting replies
    /// with random delays to exercise incremental reassembly.
    Echo(EchoArgs),
    /// Receive JSON-encoded objects and print them.
    Relay(RelayArgs),
    /// Send framed messages and optionally print echoed replies.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Echo(args) => echo::run(args, format),
        Command::Relay(args) => relay::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Address to bind, e.g. 127.0.0.1:9000.
    pub addr: SocketAddr,
    /// Reply in two parts separated by a random pause up to this
    /// duration (e.g. 2s, 500ms). Without it, replies are sent whole.
    #[arg(long, value_name = "DURATION")]
    pub max_delay: Option<String>,
}

#[derive(Args, Debug)]
pub struct RelayArgs {
    /// Address to bind, e.g. 127.0.0.1:9000.
    pub addr: SocketAddr,
    /// Maximum JSON frame length in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_object: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Address to connect to, e.g. 127.0.0.1:9000.
    pub addr: SocketAddr,
    /// Raw text payload.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// JSON payload, sent through the generic-object codec.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// Read a text payload from file.
    #[arg(long, conflicts_with_all = ["data", "json"])]
    pub file: Option<PathBuf>,
    /// Number of times to send the payload.
    #[arg(long, short = 'n', default_value = "1")]
    pub count: u32,
    /// Wait for an echoed reply after each send and print it.
    #[arg(long)]
    pub wait: bool,
    /// Pause between sends (e.g. 1s, 250ms).
    #[arg(long, value_name = "DURATION")]
    pub interval: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("soon").is_err());
    }
}
