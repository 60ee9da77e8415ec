//! Configure a TNC and send a few beacon frames.
//!
//! Run with:
//!   cargo run --example beacon -- 127.0.0.1 8001 "N0CALL beacon"

use std::thread;
use std::time::Duration;

use kisslink::Connection;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = args.next().as_deref().unwrap_or("8001").parse()?;
    let text = args.next().unwrap_or_else(|| "kisslink beacon".to_string());

    let mut conn = Connection::new();
    conn.connect(&host, port)?;

    conn.set_tx_delay(30, 0)?;
    conn.set_persistence(63, 0)?;
    conn.set_slot_time(10, 0)?;
    conn.set_full_duplex(false, 0)?;

    for n in 1..=3 {
        conn.send_data(format!("{text} #{n}").as_bytes(), 0)?;
        eprintln!("Sent beacon {n}");
        thread::sleep(Duration::from_secs(1));
    }

    conn.disconnect();
    Ok(())
}
