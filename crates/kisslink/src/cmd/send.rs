use std::fs;

use kisslink_client::Connection;
use tracing::info;

use crate::cmd::{parse_hex, SendArgs};
use crate::exit::{client_error, io_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    if payload.is_empty() {
        return Err(CliError::new(USAGE, "payload must not be empty"));
    }

    let mut conn = args.tnc.open(Connection::new())?;
    conn.send_data(&payload, args.kiss_port)
        .map_err(|err| client_error("send failed", err))?;
    info!(port = args.kiss_port, bytes = payload.len(), "data frame sent");
    conn.disconnect();

    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(hex) = &args.hex {
        return parse_hex(hex);
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "one of --data, --hex or --file is required"))
}
