use crate::exchange::ExchangeError;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error (resolve, connect, socket options).
    #[error("transport error: {0}")]
    Transport(#[from] lenframe_transport::TransportError),

    /// A request/response exchange failed.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// An earlier failure left the stream off a frame boundary.
    #[error("connection is desynchronized after a failed exchange; reconnect to continue")]
    Desynchronized,
}

impl ClientError {
    /// The exchange error, if this failure came from an exchange.
    pub fn as_exchange(&self) -> Option<&ExchangeError> {
        match self {
            ClientError::Exchange(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
