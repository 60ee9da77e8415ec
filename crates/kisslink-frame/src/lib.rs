//! KISS byte-stuffed framing.
//!
//! Every frame on the wire looks like:
//! - `FEND` (0xC0) delimiter
//! - one header byte: command in the low nibble, KISS port in the high nibble
//! - the payload, with `FEND` and `FESC` escaped as two-byte sequences
//! - a closing `FEND`
//!
//! [`FrameReader`] reassembles frames from an arbitrarily chunked byte
//! stream; [`FrameWriter`] packs and writes them.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod command;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::{KissCodec, OutboundFrame};
pub use codec::{
    decode_frame, decode_header, escape, pack_frame, pack_header, unescape, Frame, FrameConfig,
    DEFAULT_MAX_FRAME_SIZE, DEFAULT_READ_CHUNK_SIZE, FEND, FESC, MAX_PORT, TFEND, TFESC,
};
pub use command::Command;
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
