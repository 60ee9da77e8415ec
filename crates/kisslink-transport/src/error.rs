use std::net::SocketAddr;

/// Errors that can occur in TNC transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The host name could not be resolved to any socket address.
    #[error("failed to resolve {target}: {source}")]
    AddressResolution {
        target: String,
        source: std::io::Error,
    },

    /// The TNC actively refused the connection.
    #[error("connection refused by {addr}: {source}")]
    ConnectionRefused {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Any other failure while connecting.
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
