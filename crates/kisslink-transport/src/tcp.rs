use std::io::ErrorKind;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::KissStream;

/// Default TNC host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default TNC port.
pub const DEFAULT_PORT: u16 = 8000;

/// TCP transport to a KISS TNC.
pub struct TcpTransport;

impl TcpTransport {
    /// Connect to `host:port` (blocking, no timeout).
    pub fn connect(host: &str, port: u16) -> Result<KissStream> {
        Self::connect_with_timeout(host, port, None)
    }

    /// Connect to `host:port`, bounding each connect attempt by `timeout`.
    ///
    /// Every resolved address is tried in order. If all attempts fail, the
    /// error of the last attempt decides the result: a refusal maps to
    /// [`TransportError::ConnectionRefused`], anything else to
    /// [`TransportError::Connect`].
    pub fn connect_with_timeout(
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<KissStream> {
        let target = format!("{host}:{port}");
        let addrs = resolve(host, port).map_err(|source| TransportError::AddressResolution {
            target: target.clone(),
            source,
        })?;

        let mut last_failure: Option<(SocketAddr, std::io::Error)> = None;
        for addr in addrs {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    info!(%addr, "connected to tnc");
                    let stream = KissStream::from_tcp(stream);
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(err) => {
                    debug!(%addr, error = %err, "connect attempt failed");
                    last_failure = Some((addr, err));
                }
            }
        }

        match last_failure {
            Some((addr, source)) if source.kind() == ErrorKind::ConnectionRefused => {
                Err(TransportError::ConnectionRefused { addr, source })
            }
            Some((_, source)) => Err(TransportError::Connect { target, source }),
            None => Err(TransportError::AddressResolution {
                target,
                source: std::io::Error::new(ErrorKind::NotFound, "no addresses resolved"),
            }),
        }
    }
}

fn resolve(host: &str, port: u16) -> std::io::Result<Vec<SocketAddr>> {
    Ok((host, port).to_socket_addrs()?.collect())
}
