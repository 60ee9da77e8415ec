use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Args, Subcommand};
use kisslink_client::{Connection, ConnectionConfig};
use kisslink_transport::{DEFAULT_HOST, DEFAULT_PORT};

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod exit;
pub mod listen;
pub mod params;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one data frame.
    Send(SendArgs),
    /// Print received data frames.
    Listen(ListenArgs),
    /// Set TNC transmit parameters.
    Params(ParamsArgs),
    /// Take the TNC out of KISS mode.
    Exit(ExitArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args),
        Command::Listen(args) => listen::run(args, format),
        Command::Params(args) => params::run(args),
        Command::Exit(args) => exit::run(args),
        Command::Version(args) => version::run(args),
    }
}

/// Where the TNC listens.
#[derive(Args, Debug, Clone)]
pub struct TncArgs {
    /// TNC host name or address.
    #[arg(long, env = "KISSLINK_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// TNC TCP port.
    #[arg(long, env = "KISSLINK_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Connect timeout (e.g. 5s, 500ms). Default: wait indefinitely.
    #[arg(long)]
    pub connect_timeout: Option<String>,
}

impl TncArgs {
    /// Connect `conn` to the TNC named by these arguments.
    pub fn open(&self, conn: Connection) -> CliResult<Connection> {
        let config = ConnectionConfig {
            connect_timeout: self
                .connect_timeout
                .as_deref()
                .map(parse_duration)
                .transpose()?,
            ..ConnectionConfig::default()
        };
        let mut conn = conn.with_config(config);
        conn.connect(&self.host, self.port)
            .map_err(|err| client_error("connect failed", err))?;
        Ok(conn)
    }

    pub fn label(&self, conn: &Connection) -> String {
        conn.peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| format!("{}:{}", self.host, self.port))
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub tnc: TncArgs,
    /// KISS port (0-15) on the TNC.
    #[arg(long, short = 'k', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=15))]
    pub kiss_port: u8,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Hex-encoded payload (e.g. "a0b1c2").
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub tnc: TncArgs,
    /// Only print frames from these KISS ports (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub kiss_ports: Option<Vec<u8>>,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("parameter")
        .required(true)
        .multiple(true)
        .args(["tx_delay", "persistence", "slot_time", "tx_tail", "full_duplex", "hardware"]),
))]
pub struct ParamsArgs {
    #[command(flatten)]
    pub tnc: TncArgs,
    /// KISS port (0-15) on the TNC.
    #[arg(long, short = 'k', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=15))]
    pub kiss_port: u8,
    /// Transmitter keyup delay in 10 ms units (0-255).
    #[arg(long, allow_negative_numbers = true)]
    pub tx_delay: Option<i32>,
    /// Persistence value p (0-255).
    #[arg(long, allow_negative_numbers = true)]
    pub persistence: Option<i32>,
    /// Slot interval in 10 ms units (0-255).
    #[arg(long, allow_negative_numbers = true)]
    pub slot_time: Option<i32>,
    /// Post-transmit hold time in 10 ms units (0-255).
    #[arg(long, allow_negative_numbers = true)]
    pub tx_tail: Option<i32>,
    /// Full duplex (true) or half duplex (false).
    #[arg(long)]
    pub full_duplex: Option<bool>,
    /// Hex-encoded TNC-specific hardware command.
    #[arg(long)]
    pub hardware: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExitArgs {
    #[command(flatten)]
    pub tnc: TncArgs,
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

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits)
        .map_err(|err| CliError::new(USAGE, format!("invalid hex payload {input:?}: {err}")))
}
