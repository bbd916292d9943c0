//! Blocking stream transport for lenframe.
//!
//! This is the lowest layer: it opens, accepts and owns the TCP connections
//! that the framing layer reads from and writes to. Everything above works on
//! plain `Read + Write`, so [`Stream`] is only one possible handle.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::Stream;
pub use tcp::TcpTransport;
