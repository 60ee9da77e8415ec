use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::debug;

use crate::error::Result;

/// A connected TNC stream.
///
/// Cloning with [`KissStream::try_clone`] yields a second handle to the same
/// socket, so one handle can block in `read` on a worker thread while the
/// other writes frames. Calling [`KissStream::shutdown`] on either handle
/// unblocks a pending read on the other.
pub struct KissStream {
    inner: TcpStream,
}

impl Read for KissStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for KissStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl KissStream {
    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        Self { inner: stream }
    }

    /// Try to clone this stream (creates a new socket descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self::from_tcp(cloned))
    }

    /// Shut down both directions of the socket.
    ///
    /// A socket the peer already tore down reports `NotConnected`; that is
    /// treated as success since the stream is closed either way.
    pub fn shutdown(&self) -> Result<()> {
        match self.inner.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotConnected => {
                debug!("socket already disconnected at shutdown");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Set write timeout on the underlying socket.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Disable Nagle's algorithm so each frame leaves immediately.
    pub fn set_nodelay(&self, nodelay: bool) -> Result<()> {
        self.inner.set_nodelay(nodelay).map_err(Into::into)
    }

    /// Address of the connected TNC.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.inner.peer_addr().map_err(Into::into)
    }

    /// Local address of this end of the connection.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.inner.local_addr().map_err(Into::into)
    }
}

impl std::fmt::Debug for KissStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("KissStream");
        dbg.field("type", &"tcp");
        if let Ok(addr) = self.inner.peer_addr() {
            dbg.field("peer", &addr);
        }
        dbg.finish()
    }
}

/// Returns true if `err` is what a blocked read reports after its socket
/// was closed locally.
///
/// Linux and macOS report `EBADF` or `ENOTCONN` depending on timing; Windows
/// reports `WSAENOTSOCK`. Every other error is a genuine transport failure.
pub fn is_closed_error(err: &std::io::Error) -> bool {
    if err.kind() == ErrorKind::NotConnected {
        return true;
    }
    match err.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EBADF || code == libc::ENOTCONN,
        #[cfg(windows)]
        Some(code) => code == windows_sys::Win32::Networking::WinSock::WSAENOTSOCK,
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => false,
    }
}
