use std::borrow::Cow;
use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::command::Command;
use crate::error::{FrameError, Result};

/// Frame delimiter.
pub const FEND: u8 = 0xC0;
/// Escape marker.
pub const FESC: u8 = 0xDB;
/// Follows FESC to stand for a literal FEND.
pub const TFEND: u8 = 0xDC;
/// Follows FESC to stand for a literal FESC.
pub const TFESC: u8 = 0xDD;

/// Highest KISS port number (4-bit field).
pub const MAX_PORT: u8 = 0x0F;

/// Default upper bound on bytes buffered for one frame: 1 MiB.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Default size of a single transport read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4096;

/// A decoded KISS frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// KISS port (0-15).
    pub port: u8,
    /// Raw command nibble from the header byte.
    pub command: u8,
    /// The unescaped payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a data frame.
    pub fn data(port: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            port,
            command: Command::DataFrame.code(),
            payload: payload.into(),
        }
    }

    /// The command this frame carries, if it is a known one.
    pub fn command(&self) -> Option<Command> {
        Command::from_nibble(self.command)
    }

    /// Returns true for data frames, the only kind a TNC may send.
    pub fn is_data(&self) -> bool {
        self.command == Command::DataFrame.code()
    }
}

/// Escape `FESC` and `FEND` bytes in `payload`.
///
/// A single left-to-right pass: each `FESC` becomes `FESC TFESC` and each
/// `FEND` becomes `FESC TFEND`. Inserted bytes are never rescanned. Payloads
/// without reserved bytes are returned borrowed, without allocating.
pub fn escape(payload: &[u8]) -> Cow<'_, [u8]> {
    let reserved = payload
        .iter()
        .filter(|&&byte| byte == FEND || byte == FESC)
        .count();
    if reserved == 0 {
        return Cow::Borrowed(payload);
    }

    let mut out = Vec::with_capacity(payload.len() + reserved);
    for &byte in payload {
        match byte {
            FESC => out.extend_from_slice(&[FESC, TFESC]),
            FEND => out.extend_from_slice(&[FESC, TFEND]),
            _ => out.push(byte),
        }
    }
    Cow::Owned(out)
}

/// Reverse [`escape`].
///
/// `FESC TFEND` becomes `FEND` and `FESC TFESC` becomes `FESC`. A `FESC`
/// followed by anything else, or at the very end, is kept verbatim. Output
/// bytes are never re-examined, so `DB DD DC` decodes to `DB DC`.
pub fn unescape(payload: &[u8]) -> Cow<'_, [u8]> {
    if !payload.contains(&FESC) {
        return Cow::Borrowed(payload);
    }

    let mut out = Vec::with_capacity(payload.len());
    let mut i = 0;
    while i < payload.len() {
        let byte = payload[i];
        if byte == FESC {
            match payload.get(i + 1) {
                Some(&TFEND) => {
                    out.push(FEND);
                    i += 2;
                    continue;
                }
                Some(&TFESC) => {
                    out.push(FESC);
                    i += 2;
                    continue;
                }
                _ => {}
            }
        }
        out.push(byte);
        i += 1;
    }
    Cow::Owned(out)
}

/// Build the header byte for `command` on `port`.
///
/// Ports above 15 are masked to four bits; [`pack_frame`] rejects them
/// first. `Return` is always `0xFF`.
pub fn pack_header(command: Command, port: u8) -> u8 {
    match command {
        Command::Return => Command::Return.code(),
        _ => (command.code() & 0x0F) | ((port & MAX_PORT) << 4),
    }
}

/// Split a header byte into `(port, command nibble)`.
pub fn decode_header(byte: u8) -> (u8, u8) {
    ((byte & 0xF0) >> 4, byte & 0x0F)
}

/// Pack a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────┬──────────────────────┬──────────────────────┬──────┐
/// │ FEND │ Header               │ Escaped payload      │ FEND │
/// │ 0xC0 │ port << 4 | command  │ (omitted when None)  │ 0xC0 │
/// └──────┴──────────────────────┴──────────────────────┴──────┘
/// ```
///
/// Fails with [`FrameError::InvalidPort`] for ports above 15, leaving `dst`
/// untouched.
pub fn pack_frame(
    command: Command,
    port: u8,
    payload: Option<&[u8]>,
    dst: &mut BytesMut,
) -> Result<()> {
    if port > MAX_PORT {
        return Err(FrameError::InvalidPort { port });
    }

    let escaped = payload.map(escape);
    dst.reserve(3 + escaped.as_ref().map_or(0, |e| e.len()));
    dst.put_u8(FEND);
    dst.put_u8(pack_header(command, port));
    if let Some(escaped) = escaped {
        dst.put_slice(&escaped);
    }
    dst.put_u8(FEND);
    Ok(())
}

/// Decode the next frame from a buffer of raw stream bytes.
///
/// Returns `Ok(None)` if the buffer doesn't hold a complete frame yet; the
/// unterminated tail stays buffered. Delimiters with nothing before them
/// (leading, trailing or doubled FENDs) are consumed silently. On success,
/// consumes the frame bytes and its closing delimiter from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_frame_size: usize) -> Result<Option<Frame>> {
    loop {
        let Some(end) = src.iter().position(|&byte| byte == FEND) else {
            if src.len() > max_frame_size {
                return Err(FrameError::FrameTooLarge {
                    size: src.len(),
                    max: max_frame_size,
                });
            }
            return Ok(None); // Need more data
        };

        if end == 0 {
            src.advance(1);
            continue;
        }

        if end > max_frame_size {
            return Err(FrameError::FrameTooLarge {
                size: end,
                max: max_frame_size,
            });
        }

        let raw = src.split_to(end).freeze();
        src.advance(1);

        let (port, command) = decode_header(raw[0]);
        let body = raw.slice(1..);
        let payload = match unescape(&body) {
            Cow::Borrowed(_) => body.clone(),
            Cow::Owned(decoded) => Bytes::from(decoded),
        };

        return Ok(Some(Frame {
            port,
            command,
            payload,
        }));
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum bytes buffered for one frame. Default: 1 MiB.
    pub max_frame_size: usize,
    /// Bytes requested per transport read. Default: 4096.
    pub read_chunk_size: usize,
    /// Write timeout for blocking sends. Default: none.
    pub write_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            write_timeout: None,
        }
    }
}
