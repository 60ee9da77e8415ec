//! `tokio_util::codec` adapter for KISS framing.
//!
//! Lets async applications drive a TNC connection with
//! `FramedRead`/`FramedWrite` instead of the blocking reader and writer.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, pack_frame, Frame, FrameConfig};
use crate::command::Command;
use crate::error::FrameError;

/// A frame to be packed and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub command: Command,
    pub port: u8,
    pub payload: Option<Bytes>,
}

impl OutboundFrame {
    /// A data frame carrying `payload`.
    pub fn data(port: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            command: Command::DataFrame,
            port,
            payload: Some(payload.into()),
        }
    }

    /// A command frame carrying a single parameter byte.
    pub fn parameter(command: Command, port: u8, value: u8) -> Self {
        Self {
            command,
            port,
            payload: Some(Bytes::copy_from_slice(&[value])),
        }
    }
}

/// KISS codec for `tokio_util::codec::Framed*`.
#[derive(Debug, Clone, Default)]
pub struct KissCodec {
    config: FrameConfig,
}

impl KissCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }
}

impl Decoder for KissCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        decode_frame(src, self.config.max_frame_size)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None => {
                if !src.is_empty() {
                    tracing::debug!(pending = src.len(), "discarding unterminated frame at eof");
                    src.clear();
                }
                Ok(None)
            }
        }
    }
}

impl Encoder<OutboundFrame> for KissCodec {
    type Error = FrameError;

    fn encode(&mut self, item: OutboundFrame, dst: &mut BytesMut) -> Result<(), FrameError> {
        pack_frame(item.command, item.port, item.payload.as_deref(), dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::codec::{FEND, FESC};

    #[tokio::test]
    async fn framed_roundtrip_over_duplex() {
        let (client, server) = tokio::io::duplex(64);
        let mut sink = FramedWrite::new(client, KissCodec::new());
        let mut stream = FramedRead::new(server, KissCodec::new());

        sink.send(OutboundFrame::data(1, Bytes::from_static(b"hello")))
            .await
            .unwrap();
        sink.send(OutboundFrame::data(7, vec![FEND, FESC, 0x00]))
            .await
            .unwrap();
        drop(sink);

        let f1 = stream.next().await.unwrap().unwrap();
        assert_eq!((f1.port, f1.payload.as_ref()), (1, b"hello".as_ref()));

        let f2 = stream.next().await.unwrap().unwrap();
        assert_eq!(f2.port, 7);
        assert_eq!(f2.payload.as_ref(), &[FEND, FESC, 0x00]);

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn eof_discards_unterminated_tail() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut stream = FramedRead::new(server, KissCodec::new());

        tokio::io::AsyncWriteExt::write_all(&mut client, &[FEND, 0x00, 0x41, FEND, FEND, 0x00])
            .await
            .unwrap();
        drop(client);

        let frame = stream.next().await.unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"A");
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn encode_parameter_frame() {
        let mut codec = KissCodec::new();
        let mut dst = BytesMut::new();
        codec
            .encode(OutboundFrame::parameter(Command::SlotTime, 2, 10), &mut dst)
            .unwrap();
        assert_eq!(dst.as_ref(), &[FEND, 0x23, 10, FEND]);
    }

    #[test]
    fn encode_return_without_payload() {
        let mut codec = KissCodec::new();
        let mut dst = BytesMut::new();
        let frame = OutboundFrame {
            command: Command::Return,
            port: 0,
            payload: None,
        };
        codec.encode(frame, &mut dst).unwrap();
        assert_eq!(dst.as_ref(), &[FEND, 0xFF, FEND]);
    }

    #[test]
    fn encode_rejects_port_above_fifteen() {
        let mut codec = KissCodec::new();
        let mut dst = BytesMut::new();

        let err = codec
            .encode(OutboundFrame::data(16, Bytes::from_static(b"A")), &mut dst)
            .unwrap_err();

        assert!(matches!(err, FrameError::InvalidPort { port: 16 }));
        assert!(dst.is_empty());
    }

    #[tokio::test]
    async fn framed_sink_surfaces_invalid_port() {
        let (client, _server) = tokio::io::duplex(64);
        let mut sink = FramedWrite::new(client, KissCodec::new());

        let err = sink
            .send(OutboundFrame::parameter(Command::TxDelay, 20, 30))
            .await
            .unwrap_err();
        assert!(matches!(err, FrameError::InvalidPort { port: 20 }));
    }
}
