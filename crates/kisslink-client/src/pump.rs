//! Background receive loop.
//!
//! The pump is the only reader of the socket. It owns the accumulator (via
//! [`FrameReader`]), dispatches each complete data frame to the handler,
//! and stops when the connection closes or a fatal error occurs.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use kisslink_frame::{FrameConfig, FrameError, FrameReader};
use kisslink_transport::{is_closed_error, KissStream};
use tracing::{debug, error, trace};

use crate::error::{ClientError, Result};
use crate::handler::FrameHandler;

const THREAD_NAME: &str = "kisslink-pump";

/// Why a pump stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// The TNC closed its end of the connection.
    PeerClosed,
    /// The socket was closed locally, normally by `disconnect()`.
    TransportClosed,
}

/// Run the receive loop until the stream closes or fails.
///
/// `active` is checked before every dispatch; once it is cleared no further
/// frames reach the handler. A frame whose command is not DataFrame ends the
/// loop with [`ClientError::ProtocolViolation`] without being dispatched.
pub fn run<R, H>(
    reader: &mut FrameReader<R>,
    handler: &mut H,
    active: &AtomicBool,
) -> Result<PumpExit>
where
    R: Read,
    H: FrameHandler + ?Sized,
{
    loop {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) if active.load(Ordering::SeqCst) => {
                return Ok(PumpExit::PeerClosed);
            }
            Err(FrameError::ConnectionClosed) => return Ok(PumpExit::TransportClosed),
            Err(FrameError::Io(err)) if !active.load(Ordering::SeqCst) || is_closed_error(&err) => {
                debug!(error = %err, "read ended by local close");
                return Ok(PumpExit::TransportClosed);
            }
            Err(err) => return Err(err.into()),
        };

        if !active.load(Ordering::SeqCst) {
            return Ok(PumpExit::TransportClosed);
        }

        if !frame.is_data() {
            return Err(ClientError::ProtocolViolation {
                command: frame.command,
                port: frame.port,
            });
        }

        trace!(port = frame.port, bytes = frame.payload.len(), "frame received");
        handler.on_frame(frame.port, frame.payload);
    }
}

type PumpOutput = Option<Box<dyn FrameHandler>>;
type PumpBody = Box<dyn FnOnce() -> PumpOutput + Send>;
type HandlerSlot = Mutex<Option<Box<dyn FrameHandler>>>;

/// A receive thread that could not be started.
///
/// The handler never reached the thread and is handed back to the caller.
pub struct SpawnFailure {
    pub error: std::io::Error,
    pub handler: Option<Box<dyn FrameHandler>>,
}

impl std::fmt::Debug for SpawnFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnFailure")
            .field("error", &self.error)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// A running receive thread bound to one connection.
pub struct ReceivePump {
    active: Arc<AtomicBool>,
    handle: JoinHandle<PumpOutput>,
}

impl ReceivePump {
    /// Start the receive thread on `stream`.
    ///
    /// The handler moves onto the thread and is handed back by
    /// [`ReceivePump::join`], so a connection can reuse it after reconnecting.
    pub fn spawn(
        stream: KissStream,
        handler: Box<dyn FrameHandler>,
        config: FrameConfig,
    ) -> std::result::Result<Self, SpawnFailure> {
        Self::spawn_with(stream, handler, config, |body| {
            thread::Builder::new()
                .name(THREAD_NAME.to_string())
                .spawn(body)
        })
    }

    fn spawn_with<S>(
        stream: KissStream,
        handler: Box<dyn FrameHandler>,
        config: FrameConfig,
        spawner: S,
    ) -> std::result::Result<Self, SpawnFailure>
    where
        S: FnOnce(PumpBody) -> std::io::Result<JoinHandle<PumpOutput>>,
    {
        let active = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&active);
        let slot: Arc<HandlerSlot> = Arc::new(Mutex::new(Some(handler)));
        let thread_slot = Arc::clone(&slot);

        let body: PumpBody = Box::new(move || {
            let Some(mut handler) = take_handler(&thread_slot) else {
                return None;
            };
            let mut reader = FrameReader::with_config(stream, config);
            match run(&mut reader, handler.as_mut(), &flag) {
                Ok(exit) => {
                    debug!(?exit, "receive thread stopped");
                    handler.on_closed();
                }
                Err(err) => {
                    error!(error = %err, "receive thread failed");
                    handler.on_error(err);
                }
            }
            flag.store(false, Ordering::SeqCst);
            Some(handler)
        });

        match spawner(body) {
            Ok(handle) => {
                debug!("receive thread started");
                Ok(Self { active, handle })
            }
            Err(error) => {
                error!(error = %error, "receive thread could not start");
                Err(SpawnFailure {
                    error,
                    handler: take_handler(&slot),
                })
            }
        }
    }

    /// Stop dispatching frames. The thread exits at its next wakeup.
    pub fn mark_inactive(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Returns true while the thread is still running.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Wait for the thread to finish and take back its handler.
    ///
    /// Returns `None` if the handler panicked.
    pub fn join(self) -> Option<Box<dyn FrameHandler>> {
        match self.handle.join() {
            Ok(handler) => handler,
            Err(_) => {
                error!("receive thread panicked; handler dropped");
                None
            }
        }
    }
}

fn take_handler(slot: &HandlerSlot) -> Option<Box<dyn FrameHandler>> {
    slot.lock().ok().and_then(|mut handler| handler.take())
}

impl std::fmt::Debug for ReceivePump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceivePump")
            .field("active", &self.active.load(Ordering::SeqCst))
            .field("running", &self.is_running())
            .finish()
    }
}
