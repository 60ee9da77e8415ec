//! Receive-side callbacks.
//!
//! A [`FrameHandler`] runs on the receive thread, never on the caller's.
//! Applications that must process frames elsewhere (a UI loop, an async
//! task) use [`ChannelHandler`] and drain the [`ReceiveEvent`] queue from
//! wherever they need to.

use std::sync::mpsc;

use bytes::Bytes;
use tracing::{error, trace};

use crate::error::ClientError;

/// Callback for frames received from the TNC.
///
/// Calls are sequential and in arrival order. No method is called after
/// [`Connection::disconnect`](crate::Connection::disconnect) returns.
pub trait FrameHandler: Send + 'static {
    /// A complete data frame arrived on KISS `port`.
    fn on_frame(&mut self, port: u8, payload: Bytes);

    /// The receive thread stopped on a fatal error.
    fn on_error(&mut self, err: ClientError) {
        error!(error = %err, "receive thread stopped");
    }

    /// The receive thread stopped because the connection closed.
    fn on_closed(&mut self) {}
}

impl<F> FrameHandler for F
where
    F: FnMut(u8, Bytes) + Send + 'static,
{
    fn on_frame(&mut self, port: u8, payload: Bytes) {
        self(port, payload)
    }
}

/// Event forwarded by [`ChannelHandler`].
#[derive(Debug)]
pub enum ReceiveEvent {
    /// A data frame arrived.
    Frame { port: u8, payload: Bytes },
    /// The receive thread stopped because the connection closed.
    Closed,
    /// The receive thread stopped on a fatal error.
    Failed(ClientError),
}

/// Forwards every receive-side event onto an mpsc channel.
pub struct ChannelHandler {
    tx: mpsc::Sender<ReceiveEvent>,
}

impl ChannelHandler {
    fn forward(&self, event: ReceiveEvent) {
        if self.tx.send(event).is_err() {
            trace!("receive event dropped: receiver gone");
        }
    }
}

impl FrameHandler for ChannelHandler {
    fn on_frame(&mut self, port: u8, payload: Bytes) {
        self.forward(ReceiveEvent::Frame { port, payload });
    }

    fn on_error(&mut self, err: ClientError) {
        error!(error = %err, "receive thread stopped");
        self.forward(ReceiveEvent::Failed(err));
    }

    fn on_closed(&mut self) {
        self.forward(ReceiveEvent::Closed);
    }
}

/// Create a channel-backed handler and the receiver that drains it.
pub fn channel() -> (ChannelHandler, mpsc::Receiver<ReceiveEvent>) {
    let (tx, rx) = mpsc::channel();
    (ChannelHandler { tx }, rx)
}
