mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "kisslink", version, about = "KISS TNC client")]
struct Cli {
    /// Output format for received frames.
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
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "kisslink",
            "send",
            "--host",
            "tnc.local",
            "--port",
            "8001",
            "--kiss-port",
            "3",
            "--data",
            "hello",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.tnc.host, "tnc.local");
        assert_eq!(args.tnc.port, 8001);
        assert_eq!(args.kiss_port, 3);
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from(["kisslink", "send", "--hex", "c0", "--data", "hello"])
            .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_kiss_port_above_fifteen() {
        let err = Cli::try_parse_from(["kisslink", "send", "-k", "16", "--data", "x"])
            .expect_err("port 16 should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn params_requires_a_parameter() {
        let err = Cli::try_parse_from(["kisslink", "params"])
            .expect_err("params without values should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn params_accepts_negative_values_for_range_check() {
        let cli = Cli::try_parse_from(["kisslink", "params", "--tx-delay", "-1"])
            .expect("negative value should parse");
        let Command::Params(args) = cli.command else {
            panic!("expected params");
        };
        assert_eq!(args.tx_delay, Some(-1));
    }

    #[test]
    fn listen_parses_port_filter() {
        let cli = Cli::try_parse_from(["kisslink", "listen", "--kiss-ports", "0,2", "--count", "5"])
            .expect("listen args should parse");
        let Command::Listen(args) = cli.command else {
            panic!("expected listen");
        };
        assert_eq!(args.kiss_ports, Some(vec![0, 2]));
        assert_eq!(args.count, Some(5));
    }
}
