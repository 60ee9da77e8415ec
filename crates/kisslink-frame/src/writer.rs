use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use kisslink_transport::KissStream;

use crate::codec::{pack_frame, FrameConfig};
use crate::command::Command;
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Packs and writes complete frames to any `Write` stream.
///
/// Each call to [`FrameWriter::send`] packs one frame into an internal
/// buffer and writes it out in full before returning. Nothing is batched
/// across calls.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Pack and send one frame (blocking).
    pub fn send(&mut self, command: Command, port: u8, payload: Option<&[u8]>) -> Result<()> {
        self.buf.clear();
        pack_frame(command, port, payload, &mut self.buf)?;
        tracing::trace!(%command, port, bytes = self.buf.len(), "sending frame");

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<KissStream> {
    /// Create a frame writer for `KissStream` and apply write timeout from config.
    pub fn with_config_stream(inner: KissStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

fn transport_to_frame_error(err: kisslink_transport::TransportError) -> FrameError {
    match err {
        kisslink_transport::TransportError::Io(io) => FrameError::Io(io),
        kisslink_transport::TransportError::AddressResolution { source, .. }
        | kisslink_transport::TransportError::ConnectionRefused { source, .. }
        | kisslink_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
    }
}
