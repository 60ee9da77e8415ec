use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Partial reads are buffered internally; callers only see complete frames.
/// Bytes after the last delimiter stay in the accumulator until the next
/// read completes them, so escape sequences and headers may straddle reads.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    chunk: Vec<u8>,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            chunk: vec![0u8; config.read_chunk_size.max(1)],
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached. Any
    /// unterminated bytes still buffered at that point are discarded.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.next_buffered()? {
                return Ok(frame);
            }

            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if !self.buf.is_empty() {
                    tracing::debug!(
                        pending = self.buf.len(),
                        "stream closed with unterminated frame"
                    );
                }
                return Err(FrameError::ConnectionClosed);
            }

            tracing::trace!(bytes = read, "read chunk");
            self.buf.extend_from_slice(&self.chunk[..read]);
        }
    }

    /// Decode a frame that is already fully buffered, without reading.
    pub fn next_buffered(&mut self) -> Result<Option<Frame>> {
        decode_frame(&mut self.buf, self.config.max_frame_size)
    }

    /// Number of raw bytes buffered but not yet part of a complete frame.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;

    use bytes::BufMut;

    use super::*;
    use crate::codec::{pack_frame, FEND, FESC, TFEND};
    use crate::command::Command;

    fn three_frames() -> Vec<u8> {
        let mut wire = BytesMut::new();
        pack_frame(Command::DataFrame, 0, Some(b"one"), &mut wire).unwrap();
        pack_frame(Command::DataFrame, 3, Some(&[FEND, b'x', FESC]), &mut wire).unwrap();
        pack_frame(Command::DataFrame, 15, Some(b"three!"), &mut wire).unwrap();
        wire.to_vec()
    }

    fn expected_three() -> Vec<(u8, Vec<u8>)> {
        vec![
            (0, b"one".to_vec()),
            (3, vec![FEND, b'x', FESC]),
            (15, b"three!".to_vec()),
        ]
    }

    /// Hands out the wire one pre-cut chunk per `read` call.
    struct ChunkedReader {
        chunks: VecDeque<Vec<u8>>,
    }

    impl ChunkedReader {
        fn new(wire: &[u8], cuts: &[usize]) -> Self {
            let mut chunks = VecDeque::new();
            let mut start = 0;
            for &cut in cuts.iter().chain(std::iter::once(&wire.len())) {
                chunks.push_back(wire[start..cut].to_vec());
                start = cut;
            }
            Self { chunks }
        }
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let Some(mut chunk) = self.chunks.pop_front() else {
                return Ok(0);
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push_front(chunk.split_off(n));
            }
            Ok(n)
        }
    }

    fn drain<R: Read>(reader: &mut FrameReader<R>) -> Vec<(u8, Vec<u8>)> {
        let mut frames = Vec::new();
        loop {
            match reader.read_frame() {
                Ok(frame) => {
                    assert!(frame.is_data());
                    frames.push((frame.port, frame.payload.to_vec()));
                }
                Err(FrameError::ConnectionClosed) => return frames,
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
    }

    #[test]
    fn read_single_frame() {
        let mut wire = BytesMut::new();
        pack_frame(Command::DataFrame, 1, Some(b"hello"), &mut wire).unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.port, 1);
        assert_eq!(frame.payload.as_ref(), b"hello");
    }

    #[test]
    fn reassembles_in_one_chunk() {
        let wire = three_frames();
        let mut reader = FrameReader::new(ChunkedReader::new(&wire, &[]));
        assert_eq!(drain(&mut reader), expected_three());
    }

    #[test]
    fn reassembles_in_two_chunks() {
        let wire = three_frames();
        let mut reader = FrameReader::new(ChunkedReader::new(&wire, &[11]));
        assert_eq!(drain(&mut reader), expected_three());
    }

    #[test]
    fn reassembles_in_seven_chunks() {
        let wire = three_frames();
        assert_eq!(wire.len(), 23);
        let mut reader = FrameReader::new(ChunkedReader::new(&wire, &[1, 4, 7, 9, 13, 17]));
        assert_eq!(drain(&mut reader), expected_three());
    }

    #[test]
    fn reassembles_with_small_read_chunks() {
        let wire = three_frames();
        let cfg = FrameConfig {
            read_chunk_size: 3,
            ..FrameConfig::default()
        };
        let mut reader = FrameReader::with_config(Cursor::new(wire), cfg);
        assert_eq!(drain(&mut reader), expected_three());
    }

    #[test]
    fn split_escape_decodes_like_whole() {
        let wire = vec![FEND, 0x00, 0x41, FESC, TFEND, 0x42, FEND];

        let mut whole = FrameReader::new(Cursor::new(wire.clone()));
        let expected = whole.read_frame().unwrap();

        // Cut between FESC and TFEND.
        let mut split = FrameReader::new(ChunkedReader::new(&wire, &[4]));
        let frame = split.read_frame().unwrap();

        assert_eq!(frame, expected);
        assert_eq!(frame.payload.as_ref(), &[0x41, FEND, 0x42]);
    }

    #[test]
    fn partial_read_handling() {
        let wire = three_frames();
        let cuts: Vec<usize> = (1..wire.len()).collect();
        let mut reader = FrameReader::new(ChunkedReader::new(&wire, &cuts));
        assert_eq!(drain(&mut reader), expected_three());
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut partial = BytesMut::new();
        partial.put_u8(FEND);
        partial.put_u8(0x00);
        partial.put_slice(b"only-part");

        let mut reader = FrameReader::new(Cursor::new(partial.to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn unterminated_prefix_stays_buffered() {
        let mut reader = FrameReader::new(ChunkedReader::new(&[FEND, 0x00, 0x41], &[]));
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
        assert_eq!(reader.buffered_len(), 2);
        assert!(reader.next_buffered().unwrap().is_none());
    }

    #[test]
    fn oversized_frame_in_stream() {
        let cfg = FrameConfig {
            max_frame_size: 16,
            ..FrameConfig::default()
        };
        let mut reader = FrameReader::with_config(Cursor::new(vec![0x41; 64]), cfg);
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { .. }));
    }

    #[test]
    fn read_error_propagates_io_error() {
        let reader = FailingReader(ErrorKind::ConnectionReset);
        let mut framed = FrameReader::new(reader);
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::ConnectionReset));
    }

    struct FailingReader(ErrorKind);

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(self.0))
        }
    }

    #[test]
    fn interrupted_read_retries() {
        let mut wire = BytesMut::new();
        pack_frame(Command::DataFrame, 8, Some(b"ok"), &mut wire).unwrap();

        let reader = InterruptedThenData {
            interrupted: false,
            data: Cursor::new(wire.to_vec()),
        };
        let mut framed = FrameReader::new(reader);
        let frame = framed.read_frame().unwrap();

        assert_eq!(frame.port, 8);
        assert_eq!(frame.payload.as_ref(), b"ok");
    }

    struct InterruptedThenData {
        interrupted: bool,
        data: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        assert_eq!(reader.config().read_chunk_size, 4096);
        let _inner = reader.into_inner();
    }

    #[test]
    fn roundtrip_over_tcp() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = FrameReader::new(stream);
            let frame = reader.read_frame().unwrap();
            assert_eq!(frame.port, 6);
            assert_eq!(frame.payload.as_ref(), &[FESC, FEND]);
        });

        let stream = std::net::TcpStream::connect(addr).unwrap();
        let mut writer = crate::writer::FrameWriter::new(stream);
        writer
            .send(Command::DataFrame, 6, Some(&[FESC, FEND]))
            .unwrap();

        server.join().unwrap();
    }
}
