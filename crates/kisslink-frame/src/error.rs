/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Buffered bytes exceed the configured maximum without a closing FEND.
    #[error("frame too large ({size} bytes buffered without delimiter, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The KISS port does not fit in the header's four bits.
    #[error("invalid KISS port {port} (allowed 0-15)")]
    InvalidPort { port: u8 },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream reached end-of-file.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
