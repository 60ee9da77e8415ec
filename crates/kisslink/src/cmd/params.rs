use kisslink_client::{ClientError, Connection};
use tracing::info;

use crate::cmd::{parse_hex, ParamsArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};

/// Every value is range-checked before connecting; one bad value sends nothing.
pub fn run(args: ParamsArgs) -> CliResult<i32> {
    for (name, value) in [
        ("--tx-delay", args.tx_delay),
        ("--persistence", args.persistence),
        ("--slot-time", args.slot_time),
        ("--tx-tail", args.tx_tail),
    ] {
        if let Some(value) = value {
            if u8::try_from(value).is_err() {
                return Err(CliError::new(
                    USAGE,
                    format!("{name} must be between 0 and 255, got {value}"),
                ));
            }
        }
    }
    let hardware = args.hardware.as_deref().map(parse_hex).transpose()?;

    let port = args.kiss_port;
    let mut conn = args.tnc.open(Connection::new())?;
    let sent = |err: ClientError| client_error("send failed", err);

    if let Some(value) = args.persistence {
        conn.set_persistence(value, port).map_err(sent)?;
    }
    if let Some(value) = args.slot_time {
        conn.set_slot_time(value, port).map_err(sent)?;
    }
    if let Some(value) = args.tx_delay {
        conn.set_tx_delay(value, port).map_err(sent)?;
    }
    if let Some(value) = args.tx_tail {
        conn.set_tx_tail(value, port).map_err(sent)?;
    }
    if let Some(full_duplex) = args.full_duplex {
        conn.set_full_duplex(full_duplex, port).map_err(sent)?;
    }
    if let Some(hardware) = &hardware {
        conn.set_hardware(hardware, port).map_err(sent)?;
    }

    info!(port, "tnc parameters sent");
    conn.disconnect();
    Ok(SUCCESS)
}
