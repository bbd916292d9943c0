use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: a single big-endian `u32` payload length.
pub const HEADER_SIZE: usize = 4;

/// Maximum payload size in bytes, for requests and responses alike.
pub const MAX_MSG: usize = 4096;

/// A decoded message payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// The payload as text. Invalid UTF-8 sequences become U+FFFD.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Encode a payload into the wire format, enforcing [`MAX_MSG`].
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────────┐
/// │ Length       │ Payload          │
/// │ (4B BE)      │ (Length bytes)   │
/// └──────────────┴──────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    encode_frame_with_limit(payload, MAX_MSG, dst)
}

/// Encode a payload with an explicit maximum payload size.
///
/// Nothing is appended to `dst` when the payload is rejected.
pub fn encode_frame_with_limit(
    payload: &[u8],
    max_payload: usize,
    dst: &mut BytesMut,
) -> Result<()> {
    let len = validate_length(payload.len(), max_payload.min(u32::MAX as usize))?;
    dst.reserve(HEADER_SIZE + len);
    dst.put_u32(len as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Interpret a raw length prefix.
pub fn decode_length(header: [u8; HEADER_SIZE]) -> u32 {
    u32::from_be_bytes(header)
}

/// Reject any length above `max_payload`.
pub fn validate_length(len: usize, max_payload: usize) -> Result<usize> {
    if len > max_payload {
        return Err(FrameError::OversizedPayload {
            size: len,
            max: max_payload,
        });
    }
    Ok(len)
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// An oversized declared length is rejected as soon as the header is
/// available. On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&src[..HEADER_SIZE]);
    let payload_len = validate_length(decode_length(header) as usize, max_payload)?;

    if src.len() < HEADER_SIZE + payload_len {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame { payload }))
}

/// Configuration shared by frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: [`MAX_MSG`].
    pub max_payload_size: usize,
    /// Read timeout for blocking operations. `None` blocks indefinitely.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations. `None` blocks indefinitely.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_MSG,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
