//! Length-prefixed framing over a byte stream.
//!
//! Every message is a 4-byte little-endian payload length followed by the
//! payload. End of stream before the first header byte is a clean shutdown;
//! anything shorter than a full frame is fatal.

use std::io::{self, Read, Write};
use thiserror::Error;

use localscreen_core::config::DEFAULT_MAX_FRAME_BYTES;

pub const HEADER_SIZE: usize = 4;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("stream ended after {got} of 4 length-prefix bytes")]
    TruncatedHeader { got: usize },

    #[error("stream ended after {got} of {expected} payload bytes")]
    TruncatedPayload { expected: usize, got: usize },

    #[error("frame of {len} bytes exceeds the {max}-byte limit")]
    TooLarge { len: usize, max: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<FrameError> for localscreen_core::Error {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Io(io) => localscreen_core::Error::Io(io),
            other => localscreen_core::Error::Framing(other.to_string()),
        }
    }
}

/// Read until `buf` is full or the stream ends; returns the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read one frame. `Ok(None)` means the stream ended cleanly between frames.
pub fn read_frame<R: Read>(reader: &mut R, max_payload: usize) -> Result<Option<Vec<u8>>, FrameError> {
    let mut header = [0u8; HEADER_SIZE];
    match read_full(reader, &mut header)? {
        0 => return Ok(None),
        HEADER_SIZE => {}
        got => return Err(FrameError::TruncatedHeader { got }),
    }
    let len = u32::from_le_bytes(header) as usize;
    if len > max_payload {
        return Err(FrameError::TooLarge { len, max: max_payload });
    }
    let mut payload = vec![0u8; len];
    let got = read_full(reader, &mut payload)?;
    if got != len {
        return Err(FrameError::TruncatedPayload { expected: len, got });
    }
    Ok(Some(payload))
}

/// Write one frame and flush.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError> {
    let len = u32::try_from(payload.len())
        .map_err(|_| FrameError::TooLarge { len: payload.len(), max: u32::MAX as usize })?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// A duplex framed channel, typically stdin/stdout of the host process.
pub struct FramedChannel<R, W> {
    reader: R,
    writer: W,
    max_frame_bytes: usize,
}

impl<R: Read, W: Write> FramedChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self { Self::with_max_frame_bytes(reader, writer, DEFAULT_MAX_FRAME_BYTES) }

    pub fn with_max_frame_bytes(reader: R, writer: W, max_frame_bytes: usize) -> Self {
        Self { reader, writer, max_frame_bytes }
    }

    pub fn read_message(&mut self) -> Result<Option<Vec<u8>>, FrameError> { read_frame(&mut self.reader, self.max_frame_bytes) }

    pub fn write_message(&mut self, payload: &[u8]) -> Result<(), FrameError> { write_frame(&mut self.writer, payload) }

    pub fn writer(&self) -> &W { &self.writer }

    pub fn into_parts(self) -> (R, W) { (self.reader, self.writer) }
}
