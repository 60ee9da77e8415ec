//! KISS TNC connection management.
//!
//! This is the layer applications use. Open a [`Connection`] to a TNC,
//! send data and parameter frames, and receive data frames through a
//! [`FrameHandler`] that runs on a dedicated receive thread.
//!
//! ```no_run
//! use kisslink_client::{Connection, ReceiveEvent};
//!
//! let (mut conn, events) = Connection::new().with_channel();
//! conn.connect("127.0.0.1", 8001)?;
//! conn.set_tx_delay(30, 0)?;
//! conn.send_data(b"hello", 0)?;
//!
//! if let Ok(ReceiveEvent::Frame { port, payload }) = events.recv() {
//!     println!("port {port}: {} bytes", payload.len());
//! }
//! conn.disconnect();
//! # Ok::<(), kisslink_client::ClientError>(())
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod pump;

pub use config::ConnectionConfig;
pub use connection::Connection;
pub use error::{ClientError, Result};
pub use handler::{channel, ChannelHandler, FrameHandler, ReceiveEvent};
pub use pump::{PumpExit, ReceivePump, SpawnFailure};
