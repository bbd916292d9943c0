use lenframe_transport::TcpTransport;
use tracing::info;

use crate::client::{Client, ClientConfig};
use crate::error::Result;

/// Connect to a server with default configuration.
pub fn connect(addr: &str) -> Result<Client> {
    connect_with_config(addr, &ClientConfig::default())
}

/// Connect with explicit configuration.
///
/// Connection failures are returned to the caller rather than ending the
/// process.
pub fn connect_with_config(addr: &str, config: &ClientConfig) -> Result<Client> {
    let stream = match config.connect_timeout {
        Some(timeout) => TcpTransport::connect_timeout(addr, timeout)?,
        None => TcpTransport::connect(addr)?,
    };

    stream.set_read_timeout(config.frame.read_timeout)?;
    stream.set_write_timeout(config.frame.write_timeout)?;
    stream.set_nodelay(true)?;

    info!(addr, peer = ?stream.peer_addr(), "connected");
    Ok(Client::from_stream(stream, config.frame.clone()))
}
