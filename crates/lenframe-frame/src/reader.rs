use std::io::Read;

use bytes::BytesMut;
use lenframe_transport::Stream;
use tracing::trace;

use crate::codec::{decode_length, validate_length, Frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::io::read_full;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally — callers always get complete frames.
/// No bytes are buffered between frames, so the inner stream is always
/// positioned at a frame boundary after a successful read.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete frame (blocking).
    pub fn read_frame(&mut self) -> Result<Frame> {
        let len = self.read_header()?;
        let payload = self.read_payload(len)?;
        Ok(Frame { payload: payload.freeze() })
    }

    /// Read and validate a length prefix, returning the declared payload size.
    ///
    /// On [`FrameError::OversizedPayload`] the payload is left unread in the
    /// stream.
    pub fn read_header(&mut self) -> Result<usize> {
        let mut header = [0u8; HEADER_SIZE];
        read_full(&mut self.inner, &mut header)?;
        let len = decode_length(header) as usize;
        trace!(len, "read frame header");
        validate_length(len, self.config.max_payload_size)
    }

    /// Read exactly `len` payload bytes.
    pub fn read_payload(&mut self, len: usize) -> Result<BytesMut> {
        let mut payload = BytesMut::zeroed(len);
        read_full(&mut self.inner, &mut payload)?;
        Ok(payload)
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

    /// Update maximum payload size for subsequent frame decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<Stream> {
    /// Create a frame reader for a [`Stream`] and apply read timeout from config.
    pub fn with_config_stream(inner: Stream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

fn transport_to_frame_error(err: lenframe_transport::TransportError) -> FrameError {
    match err {
        lenframe_transport::TransportError::Io(io) => FrameError::TransportRead(io),
        other => FrameError::TransportRead(std::io::Error::other(other.to_string())),
    }
}
