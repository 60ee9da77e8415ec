//! Monitor a TNC from async code using the tokio codec.
//!
//! Run with:
//!   cargo run --example async-monitor --features async -- 127.0.0.1:8001

use futures_util::StreamExt;
use kisslink::frame::KissCodec;
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8001".to_string());

    let stream = TcpStream::connect(&target).await?;
    eprintln!("Monitoring {target}");

    let mut frames = FramedRead::new(stream, KissCodec::new());
    while let Some(frame) = frames.next().await {
        let frame = frame?;
        if frame.is_data() {
            println!("[{}] {} bytes", frame.port, frame.payload.len());
        } else {
            eprintln!(
                "Ignoring {} on port {}",
                frame
                    .command()
                    .map_or_else(|| format!("{:#04x}", frame.command), |c| c.to_string()),
                frame.port
            );
        }
    }

    Ok(())
}
