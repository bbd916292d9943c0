//! One request frame out, one response frame back.

use std::fmt;
use std::io::{Read, Write};

use bytes::Bytes;
use lenframe_frame::{validate_length, FrameConfig, FrameError, FrameReader, FrameWriter};
use tracing::{debug, warn};

/// The step of an exchange that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Write,
    ReadHeader,
    ReadBody,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Write => "write",
            Stage::ReadHeader => "read-header",
            Stage::ReadBody => "read-body",
        })
    }
}

/// Which side of the exchange carried an oversized payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Request => "request",
            Direction::Response => "response",
        })
    }
}

/// Errors from a single request/response exchange.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The request, or the response's declared length, exceeds the maximum.
    ///
    /// For requests nothing was sent. For responses the body was not drained.
    #[error("{direction} payload too large ({size} bytes, max {max})")]
    OversizedPayload {
        direction: Direction,
        size: usize,
        max: usize,
    },

    /// A transfer failed at `stage`.
    #[error("exchange failed during {stage}: {source}")]
    Failed {
        stage: Stage,
        #[source]
        source: FrameError,
    },
}

impl ExchangeError {
    /// The failing stage, if the error came from a transfer.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ExchangeError::Failed { stage, .. } => Some(*stage),
            ExchangeError::OversizedPayload { .. } => None,
        }
    }

    /// Whether the stream may be left off a frame boundary.
    ///
    /// Only a rejected request is known to have left the stream untouched.
    pub fn leaves_stream_desynchronized(&self) -> bool {
        !matches!(
            self,
            ExchangeError::OversizedPayload {
                direction: Direction::Request,
                ..
            }
        )
    }
}

/// Send `request` as one frame and read back exactly one response frame.
///
/// Blocks until the response arrives or a transfer fails. Buffers live only
/// for the duration of this call.
pub fn exchange<S>(
    stream: &mut S,
    request: &[u8],
    config: &FrameConfig,
) -> Result<Bytes, ExchangeError>
where
    S: Read + Write + ?Sized,
{
    validate_length(request.len(), config.max_payload_size).map_err(|_| {
        ExchangeError::OversizedPayload {
            direction: Direction::Request,
            size: request.len(),
            max: config.max_payload_size,
        }
    })?;

    FrameWriter::with_config(&mut *stream, config.clone())
        .send(request)
        .map_err(|source| {
            warn!(error = %source, "failed sending request");
            ExchangeError::Failed {
                stage: Stage::Write,
                source,
            }
        })?;

    let mut reader = FrameReader::with_config(&mut *stream, config.clone());
    let len = match reader.read_header() {
        Ok(len) => len,
        Err(FrameError::OversizedPayload { size, max }) => {
            warn!(size, max, "response too long");
            return Err(ExchangeError::OversizedPayload {
                direction: Direction::Response,
                size,
                max,
            });
        }
        Err(source) => {
            if source.is_clean_close() {
                warn!("peer closed connection before responding");
            } else {
                warn!(error = %source, "failed reading response header");
            }
            return Err(ExchangeError::Failed {
                stage: Stage::ReadHeader,
                source,
            });
        }
    };

    let payload = reader.read_payload(len).map_err(|source| {
        warn!(error = %source, expected = len, "failed reading response body");
        ExchangeError::Failed {
            stage: Stage::ReadBody,
            source,
        }
    })?;

    debug!(
        request_len = request.len(),
        response_len = len,
        "exchange complete"
    );
    Ok(payload.freeze())
}

/// Text form of [`exchange`]. The response is decoded lossily as UTF-8.
pub fn query<S>(stream: &mut S, text: &str, config: &FrameConfig) -> Result<String, ExchangeError>
where
    S: Read + Write + ?Sized,
{
    let response = exchange(stream, text.as_bytes(), config)?;
    Ok(String::from_utf8_lossy(&response).into_owned())
}
