//! Exact-size transfers over streams that may move fewer bytes per call
//! than requested.

use std::io::{ErrorKind, Read, Write};

use tracing::trace;

use crate::error::{FrameError, Result};

/// Write every byte of `buf`, looping over short writes.
///
/// A write that reports zero bytes or returns any error aborts the transfer
/// with [`FrameError::TransportWrite`]. Interrupted writes are not retried.
pub fn write_all<W: Write + ?Sized>(writer: &mut W, buf: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < buf.len() {
        match writer.write(&buf[offset..]) {
            Ok(0) => {
                return Err(FrameError::TransportWrite(std::io::Error::new(
                    ErrorKind::WriteZero,
                    "peer accepted zero bytes",
                )));
            }
            Ok(n) => {
                debug_assert!(n <= buf.len() - offset);
                offset += n;
                if offset < buf.len() {
                    trace!(written = n, remaining = buf.len() - offset, "short write");
                }
            }
            Err(err) => return Err(FrameError::TransportWrite(err)),
        }
    }
    Ok(())
}

/// Fill `buf` completely, looping over short reads.
///
/// An interrupted read is retried with the same remaining count. A read of
/// zero bytes before `buf` is full fails with [`FrameError::UnexpectedEof`];
/// any other error fails with [`FrameError::TransportRead`].
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let expected = buf.len();
    let mut filled = 0usize;
    while filled < expected {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(FrameError::UnexpectedEof {
                    received: filled,
                    expected,
                });
            }
            Ok(n) => {
                debug_assert!(n <= expected - filled);
                filled += n;
                if filled < expected {
                    trace!(read = n, remaining = expected - filled, "short read");
                }
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => {
                trace!("read interrupted, retrying");
                continue;
            }
            Err(err) => return Err(FrameError::TransportRead(err)),
        }
    }
    Ok(())
}
