use kisslink_client::Connection;

use crate::cmd::ExitArgs;
use crate::exit::{client_error, CliResult, SUCCESS};

pub fn run(args: ExitArgs) -> CliResult<i32> {
    let mut conn = args.tnc.open(Connection::new())?;
    conn.send_return()
        .map_err(|err| client_error("send failed", err))?;
    conn.disconnect();
    Ok(SUCCESS)
}
