use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use kisslink_client::{Connection, ReceiveEvent};
use tracing::{info, warn};

use crate::cmd::ListenArgs;
use crate::exit::{client_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_frame, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let (conn, events) = Connection::new().with_channel();
    let mut conn = args.tnc.open(conn)?;
    let tnc = args.tnc.label(&conn);

    let mut printed = 0usize;
    let result = loop {
        if !running.load(Ordering::SeqCst) {
            info!("interrupted");
            break Ok(SUCCESS);
        }

        let (port, payload) = match events.recv_timeout(POLL_INTERVAL) {
            Ok(ReceiveEvent::Frame { port, payload }) => (port, payload),
            Ok(ReceiveEvent::Closed) => {
                warn!(%tnc, "tnc closed the connection");
                break Ok(SUCCESS);
            }
            Ok(ReceiveEvent::Failed(err)) => break Err(client_error("receive failed", err)),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break Ok(SUCCESS),
        };

        if let Some(ports) = &args.kiss_ports {
            if !ports.contains(&port) {
                continue;
            }
        }

        print_frame(port, &payload, &tnc, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break Ok(SUCCESS);
            }
        }
    };

    conn.disconnect();
    result
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
