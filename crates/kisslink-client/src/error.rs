use std::net::SocketAddr;

use kisslink_frame::FrameError;
use kisslink_transport::TransportError;

/// Errors that can occur in connection operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// `connect` was called on a connection that is already open.
    #[error("already connected")]
    AlreadyConnected,

    /// A send was attempted without an open connection.
    #[error("not connected")]
    NotConnected,

    /// The TNC host name could not be resolved.
    #[error("failed to resolve {target}: {source}")]
    AddressResolution {
        target: String,
        source: std::io::Error,
    },

    /// The TNC refused the connection.
    #[error("connection refused by {addr}: {source}")]
    ConnectionRefused {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Any other failure while connecting.
    #[error("connection to {target} failed: {source}")]
    Connect {
        target: String,
        source: std::io::Error,
    },

    /// A parameter was outside its allowed range. Nothing was sent.
    #[error("invalid {name}: {value} (allowed {min}-{max})")]
    InvalidParameter {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The TNC sent a frame with a command other than DataFrame.
    #[error("protocol violation: received command {command:#04x} on port {port}, only data frames may be received")]
    ProtocolViolation { command: u8, port: u8 },

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Transport-level error after the connection was established.
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// The receive thread could not be started.
    #[error("failed to start receive thread: {0}")]
    Spawn(std::io::Error),
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::AddressResolution { target, source } => {
                ClientError::AddressResolution { target, source }
            }
            TransportError::ConnectionRefused { addr, source } => {
                ClientError::ConnectionRefused { addr, source }
            }
            TransportError::Connect { target, source } => ClientError::Connect { target, source },
            other => ClientError::Transport(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
