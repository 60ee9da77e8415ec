//! Print every frame heard by a TNC until it closes the connection.
//!
//! Run with:
//!   cargo run --example heard -- 127.0.0.1 8001

use kisslink::{Connection, ReceiveEvent};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = args.next().as_deref().unwrap_or("8001").parse()?;

    let (mut conn, events) = Connection::new().with_channel();
    conn.connect(&host, port)?;
    eprintln!("Listening on {host}:{port}");

    for event in events {
        match event {
            ReceiveEvent::Frame { port, payload } => {
                println!("[{port}] {}", String::from_utf8_lossy(&payload));
            }
            ReceiveEvent::Closed => {
                eprintln!("TNC closed the connection");
                break;
            }
            ReceiveEvent::Failed(err) => {
                eprintln!("Receive failed: {err}");
                break;
            }
        }
    }

    conn.disconnect();
    Ok(())
}
