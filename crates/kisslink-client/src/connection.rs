use std::net::SocketAddr;
use std::sync::mpsc;

use kisslink_frame::{Command, FrameWriter, MAX_PORT};
use kisslink_transport::{KissStream, TcpTransport, DEFAULT_HOST, DEFAULT_PORT};
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{ClientError, Result};
use crate::handler::{self, FrameHandler, ReceiveEvent};
use crate::pump::ReceivePump;

enum State {
    Disconnected,
    Connected {
        writer: FrameWriter<KissStream>,
        pump: Option<ReceivePump>,
    },
}

/// A connection to a KISS TNC.
///
/// Without a handler the connection is send-only and starts no threads.
/// With one, each successful [`connect`](Connection::connect) starts exactly
/// one receive thread, and [`disconnect`](Connection::disconnect) stops it.
/// An instance may be connected again after it has been disconnected.
///
/// Send methods take `&mut self`; concurrent senders must share the
/// connection behind their own lock.
pub struct Connection {
    state: State,
    handler: Option<Box<dyn FrameHandler>>,
    config: ConnectionConfig,
}

impl Connection {
    /// Create a send-only connection.
    pub fn new() -> Self {
        Self {
            state: State::Disconnected,
            handler: None,
            config: ConnectionConfig::default(),
        }
    }

    /// Attach a handler for received frames.
    pub fn with_handler(mut self, handler: impl FrameHandler) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Attach a channel handler and return the receiving end.
    pub fn with_channel(self) -> (Self, mpsc::Receiver<ReceiveEvent>) {
        let (handler, rx) = handler::channel();
        (self.with_handler(handler), rx)
    }

    /// Override connection config.
    pub fn with_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Connect to the TNC at `host:port`.
    ///
    /// Fails with [`ClientError::AlreadyConnected`] if a connection is open,
    /// without touching it.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        if matches!(self.state, State::Connected { .. }) {
            return Err(ClientError::AlreadyConnected);
        }

        let stream = TcpTransport::connect_with_timeout(host, port, self.config.connect_timeout)?;
        let reader_stream = match self.handler {
            Some(_) => Some(stream.try_clone()?),
            None => None,
        };
        let writer = FrameWriter::with_config_stream(stream, self.config.frame.clone())?;

        let pump = match (reader_stream, self.handler.take()) {
            (Some(reader_stream), Some(handler)) => {
                match ReceivePump::spawn(reader_stream, handler, self.config.frame.clone()) {
                    Ok(pump) => Some(pump),
                    Err(failure) => {
                        self.handler = failure.handler;
                        return Err(ClientError::Spawn(failure.error));
                    }
                }
            }
            _ => None,
        };

        self.state = State::Connected { writer, pump };
        Ok(())
    }

    /// Connect to the default TNC address, `127.0.0.1:8000`.
    pub fn connect_default(&mut self) -> Result<()> {
        self.connect(DEFAULT_HOST, DEFAULT_PORT)
    }

    /// Close the connection.
    ///
    /// Stops dispatch, shuts the socket down so the receive thread's blocked
    /// read returns, then waits for that thread to exit. The handler is not
    /// called again once this returns. Calling it while disconnected does
    /// nothing.
    pub fn disconnect(&mut self) {
        let State::Connected { writer, pump } =
            std::mem::replace(&mut self.state, State::Disconnected)
        else {
            return;
        };

        if let Some(pump) = &pump {
            pump.mark_inactive();
        }
        if let Err(err) = writer.get_ref().shutdown() {
            warn!(error = %err, "socket shutdown failed");
        }
        drop(writer);

        if let Some(pump) = pump {
            self.handler = pump.join();
        }
        info!("disconnected from tnc");
    }

    /// Returns true while a transport connection is open.
    pub fn is_connected(&self) -> bool {
        matches!(self.state, State::Connected { .. })
    }

    /// Returns true while the receive thread is running.
    ///
    /// False for send-only connections, and after the thread stopped on its
    /// own because the TNC closed the connection or broke protocol.
    pub fn is_receiving(&self) -> bool {
        match &self.state {
            State::Connected {
                pump: Some(pump), ..
            } => pump.is_running(),
            _ => false,
        }
    }

    /// Address of the connected TNC.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            State::Connected { writer, .. } => writer.get_ref().peer_addr().ok(),
            State::Disconnected => None,
        }
    }

    /// Current connection config.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Send `payload` in a data frame on KISS `port`.
    ///
    /// An empty payload sends nothing.
    pub fn send_data(&mut self, payload: &[u8], port: u8) -> Result<()> {
        if payload.is_empty() {
            return Ok(());
        }
        self.send_frame(Command::DataFrame, port, Some(payload))
    }

    /// Set the transmitter keyup delay, in 10 ms units (0-255).
    pub fn set_tx_delay(&mut self, tx_delay: i32, port: u8) -> Result<()> {
        self.send_parameter(Command::TxDelay, "tx_delay", tx_delay, port)
    }

    /// Set the persistence value `p` (0-255).
    pub fn set_persistence(&mut self, persistence: i32, port: u8) -> Result<()> {
        self.send_parameter(Command::Persistence, "persistence", persistence, port)
    }

    /// Set the slot interval, in 10 ms units (0-255).
    pub fn set_slot_time(&mut self, slot_time: i32, port: u8) -> Result<()> {
        self.send_parameter(Command::SlotTime, "slot_time", slot_time, port)
    }

    /// Set the post-transmit hold up time, in 10 ms units (0-255).
    pub fn set_tx_tail(&mut self, tx_tail: i32, port: u8) -> Result<()> {
        self.send_parameter(Command::TxTail, "tx_tail", tx_tail, port)
    }

    /// Select full duplex (`true`) or half duplex (`false`).
    pub fn set_full_duplex(&mut self, full_duplex: bool, port: u8) -> Result<()> {
        self.send_frame(Command::FullDuplex, port, Some(&[u8::from(full_duplex)]))
    }

    /// Send a TNC-specific hardware command. The bytes are not interpreted.
    pub fn set_hardware(&mut self, hardware: &[u8], port: u8) -> Result<()> {
        self.send_frame(Command::SetHardware, port, Some(hardware))
    }

    /// Tell the TNC to leave KISS mode.
    pub fn send_return(&mut self) -> Result<()> {
        self.send_frame(Command::Return, 0, None)
    }

    fn send_parameter(
        &mut self,
        command: Command,
        name: &'static str,
        value: i32,
        port: u8,
    ) -> Result<()> {
        let byte = u8::try_from(value).map_err(|_| ClientError::InvalidParameter {
            name,
            value: i64::from(value),
            min: 0,
            max: i64::from(u8::MAX),
        })?;
        self.send_frame(command, port, Some(&[byte]))
    }

    fn send_frame(&mut self, command: Command, port: u8, payload: Option<&[u8]>) -> Result<()> {
        if port > MAX_PORT {
            return Err(ClientError::InvalidParameter {
                name: "port",
                value: i64::from(port),
                min: 0,
                max: i64::from(MAX_PORT),
            });
        }

        let State::Connected { writer, .. } = &mut self.state else {
            return Err(ClientError::NotConnected);
        };
        writer.send(command, port, payload)?;
        debug!(%command, port, "frame sent");
        Ok(())
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("Connection");
        match &self.state {
            State::Disconnected => dbg.field("state", &"disconnected"),
            State::Connected { writer, pump } => dbg
                .field("state", &"connected")
                .field("stream", writer.get_ref())
                .field("pump", pump),
        };
        dbg.field("config", &self.config).finish()
    }
}
