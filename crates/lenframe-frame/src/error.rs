/// Errors that can occur during frame encoding, decoding and transfer.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload (outgoing) or declared length (incoming) exceeds the maximum.
    #[error("payload too large ({size} bytes, max {max})")]
    OversizedPayload { size: usize, max: usize },

    /// A write attempt failed or made no progress. Never retried.
    #[error("transport write failed: {0}")]
    TransportWrite(#[source] std::io::Error),

    /// A read attempt failed for a reason other than interruption.
    #[error("transport read failed: {0}")]
    TransportRead(#[source] std::io::Error),

    /// The peer closed the stream before the requested bytes arrived.
    #[error("unexpected EOF after {received} of {expected} bytes")]
    UnexpectedEof { received: usize, expected: usize },
}

impl FrameError {
    /// True when the peer closed the stream before sending anything at all.
    pub fn is_clean_close(&self) -> bool {
        matches!(self, FrameError::UnexpectedEof { received: 0, .. })
    }
}

// `tokio_util` codecs surface stream read errors through this conversion.
#[cfg(feature = "async")]
impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        FrameError::TransportRead(err)
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
