use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::Stream;

/// TCP transport.
///
/// Provides bind/accept for the responder side and connect for clients.
/// All operations are blocking.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `addr` (e.g. `127.0.0.1:1234`, or port `0` for an
    /// ephemeral port).
    pub fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        let local_addr = listener.local_addr().map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

        info!(%local_addr, "listening on tcp socket");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<Stream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted connection");
        Ok(Stream::from_tcp(stream))
    }

    /// Connect to a listening peer (blocking, no timeout).
    pub fn connect(addr: &str) -> Result<Stream> {
        connect_each(addr, |candidate| TcpStream::connect(candidate))
    }

    /// Connect with an upper bound on the time spent per resolved address.
    pub fn connect_timeout(addr: &str, timeout: Duration) -> Result<Stream> {
        connect_each(addr, |candidate| TcpStream::connect_timeout(candidate, timeout))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

}

/// Resolve `addr` and try every candidate in order.
///
/// The last connect error is reported if none succeeds.
fn connect_each<F>(addr: &str, mut attempt: F) -> Result<Stream>
where
    F: FnMut(&SocketAddr) -> std::io::Result<TcpStream>,
{
    let candidates = addr
        .to_socket_addrs()
        .map_err(|e| TransportError::Resolve {
            addr: addr.to_string(),
            source: e,
        })?;

    let mut last_err = None;
    for candidate in candidates {
        match attempt(&candidate) {
            Ok(stream) => {
                debug!(addr, %candidate, "connected to tcp socket");
                return Ok(Stream::from_tcp(stream));
            }
            Err(err) => {
                debug!(%candidate, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    match last_err {
        Some(source) => Err(TransportError::Connect {
            addr: addr.to_string(),
            source,
        }),
        None => Err(TransportError::NoAddress {
            addr: addr.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{ErrorKind, Read, Write};

    #[test]
    fn test_bind_accept_connect() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();

        let handle = std::thread::spawn(move || {
            let mut client = TcpTransport::connect(&addr).unwrap();
            client.write_all(b"hello").unwrap();
        });

        let mut server = listener.accept().unwrap();
        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        assert!(server.peer_addr().is_some());

        handle.join().unwrap();
    }

    #[test]
    fn test_connect_timeout_succeeds() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();

        let stream = TcpTransport::connect_timeout(&addr, Duration::from_secs(2)).unwrap();
        assert_eq!(
            stream.peer_addr().map(|a| a.port()),
            Some(listener.local_addr().port())
        );
    }

    #[test]
    fn test_connect_refused() {
        // Bind then drop to find a port nobody is listening on.
        let port = {
            let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
            listener.local_addr().port()
        };
        let addr = format!("127.0.0.1:{port}");

        let err = TcpTransport::connect(&addr).unwrap_err();
        match err {
            TransportError::Connect { addr: a, source } => {
                assert_eq!(a, addr);
                assert_eq!(source.kind(), ErrorKind::ConnectionRefused);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_connect_unresolvable() {
        let err = TcpTransport::connect("not an address").unwrap_err();
        assert!(matches!(err, TransportError::Resolve { .. }));
    }

    #[test]
    fn test_connect_timeout_unresolvable() {
        let err = TcpTransport::connect_timeout("not an address", Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, TransportError::Resolve { .. }));
    }

    #[test]
    fn test_bind_in_use() {
        let first = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = first.local_addr().to_string();
        let err = TcpTransport::bind(&addr).err().expect("second bind should fail");
        assert!(matches!(err, TransportError::Bind { .. }));
    }

    #[test]
    fn test_stream_timeouts_apply() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();
        let client = TcpTransport::connect(&addr).unwrap();
        let _server = listener.accept().unwrap();

        client
            .set_read_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        client
            .set_write_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        client.set_nodelay(true).unwrap();

        let mut client = client;
        let mut buf = [0u8; 1];
        let err = client.read(&mut buf).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::WouldBlock | ErrorKind::TimedOut
        ));
    }
}
