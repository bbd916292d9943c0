use std::io::{Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use lenframe_frame::FrameConfig;
use lenframe_transport::Stream;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::exchange::exchange;

/// Configuration for a client connection.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Upper bound on establishing the connection. `None` uses the OS default.
    pub connect_timeout: Option<Duration>,
    /// Payload limit and per-operation read/write timeouts.
    pub frame: FrameConfig,
}

/// A connected request/response client.
///
/// The client exclusively owns its stream; dropping the client closes it.
/// After any failure that may have left the stream off a frame boundary,
/// every further call returns [`ClientError::Desynchronized`] without
/// touching the stream.
pub struct Client<S = Stream> {
    stream: S,
    config: FrameConfig,
    desynchronized: bool,
    completed: u64,
}

impl<S: Read + Write> Client<S> {
    /// Wrap an already connected stream.
    pub fn from_stream(stream: S, config: FrameConfig) -> Self {
        Self {
            stream,
            config,
            desynchronized: false,
            completed: 0,
        }
    }

    /// Send one request payload and wait for its response payload.
    pub fn exchange(&mut self, request: &[u8]) -> Result<Bytes> {
        if self.desynchronized {
            return Err(ClientError::Desynchronized);
        }

        match exchange(&mut self.stream, request, &self.config) {
            Ok(response) => {
                self.completed += 1;
                Ok(response)
            }
            Err(err) => {
                if err.leaves_stream_desynchronized() {
                    debug!("marking connection desynchronized");
                    self.desynchronized = true;
                }
                Err(err.into())
            }
        }
    }

    /// Send a text request and return the response as text.
    ///
    /// Invalid UTF-8 in the response is replaced with U+FFFD.
    pub fn query(&mut self, text: &str) -> Result<String> {
        let response = self.exchange(text.as_bytes())?;
        Ok(String::from_utf8_lossy(&response).into_owned())
    }

    /// True once a failed exchange has made the connection unusable.
    pub fn is_desynchronized(&self) -> bool {
        self.desynchronized
    }

    /// Number of exchanges completed on this connection.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Consume the client and return the inner stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl Client<Stream> {
    /// Address of the connected server, if known.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.peer_addr()
    }
}

impl<S> std::fmt::Debug for Client<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("desynchronized", &self.desynchronized)
            .field("completed", &self.completed)
            .field("max_payload_size", &self.config.max_payload_size)
            .finish()
    }
}
