use std::time::Duration;

use kisslink_frame::FrameConfig;

/// Configuration for a [`Connection`](crate::Connection).
///
/// Defaults mirror plain KISS-over-TCP behavior: no connect timeout and no
/// write timeout, so both can block indefinitely on an unresponsive TNC.
/// There is no read timeout; the receive thread blocks until data arrives
/// or the connection is closed.
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfig {
    /// Bound on each TCP connect attempt.
    pub connect_timeout: Option<Duration>,
    /// Framing limits and the write timeout applied to the socket.
    pub frame: FrameConfig,
}
