//! `tokio_util::codec` adapter for the lenframe wire format.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{
    decode_frame, decode_length, encode_frame_with_limit, Frame, HEADER_SIZE, MAX_MSG,
};
use crate::error::FrameError;

/// Length-prefixed codec for `Framed` async streams.
#[derive(Debug, Clone)]
pub struct LengthCodec {
    max_payload_size: usize,
}

impl LengthCodec {
    /// Create a codec enforcing [`MAX_MSG`].
    pub fn new() -> Self {
        Self::with_max_payload(MAX_MSG)
    }

    /// Create a codec with an explicit maximum payload size.
    pub fn with_max_payload(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }

    /// Largest payload this codec accepts in either direction.
    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }
}

impl Default for LengthCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LengthCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        decode_frame(src, self.max_payload_size)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(FrameError::UnexpectedEof {
                received: src.len(),
                expected: expected_len(src),
            }),
        }
    }
}

impl Encoder<Bytes> for LengthCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame_with_limit(item.as_ref(), self.max_payload_size, dst)
    }
}

impl Encoder<&[u8]> for LengthCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame_with_limit(item, self.max_payload_size, dst)
    }
}

// Total bytes the partial frame in `src` would need, header included.
fn expected_len(src: &BytesMut) -> usize {
    if src.len() < HEADER_SIZE {
        return HEADER_SIZE;
    }
    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&src[..HEADER_SIZE]);
    HEADER_SIZE + decode_length(header) as usize
}
