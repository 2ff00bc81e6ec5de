mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "netstrings", version, about = "Netstring framed-message tools")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_echo_subcommand() {
        let cli = Cli::try_parse_from(["netstrings", "echo", "127.0.0.1:9000", "--max-delay", "2s"])
            .expect("echo args should parse");
        assert!(matches!(cli.command, Command::Echo(_)));
    }

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "netstrings",
            "send",
            "127.0.0.1:9000",
            "--data",
            "hello",
            "--count",
            "3",
            "--wait",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "netstrings",
            "send",
            "127.0.0.1:9000",
            "--json",
            "{\"x\":1}",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_relay_subcommand() {
        let cli = Cli::try_parse_from([
            "netstrings",
            "relay",
            "127.0.0.1:9000",
            "--max-object",
            "32768",
        ])
        .expect("relay args should parse");
        assert!(matches!(cli.command, Command::Relay(_)));
    }

    #[test]
    fn rejects_invalid_bind_address() {
        let err = Cli::try_parse_from(["netstrings", "echo", "not-an-addr"])
            .expect_err("invalid addr should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
