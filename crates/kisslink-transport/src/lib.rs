//! TCP stream transport for KISS TNC connections.
//!
//! KISS TNCs such as Direwolf or soundmodem expose their framed byte stream
//! over a plain TCP port. This is the lowest layer of kisslink: it resolves
//! and connects to `host:port`, classifies connect failures, and hands out a
//! [`KissStream`] that the framing layer reads and writes.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::{is_closed_error, KissStream};
pub use tcp::{TcpTransport, DEFAULT_HOST, DEFAULT_PORT};
