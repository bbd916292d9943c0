use std::io::Write;

use bytes::BytesMut;
use lenframe_transport::Stream;

use crate::codec::{encode_frame_with_limit, Frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::io::write_all;

/// Writes complete frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Write a complete frame (blocking).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.payload.as_ref())
    }

    /// Encode and send a payload.
    ///
    /// An oversized payload is rejected before any byte reaches the stream.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        encode_frame_with_limit(payload, self.config.max_payload_size, &mut buf)?;

        write_all(&mut self.inner, &buf)?;
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(FrameError::TransportWrite)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame encoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<Stream> {
    /// Create a frame writer for a [`Stream`] and apply write timeout from config.
    pub fn with_config_stream(inner: Stream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(|err| match err {
                lenframe_transport::TransportError::Io(io) => FrameError::TransportWrite(io),
                other => FrameError::TransportWrite(std::io::Error::other(other.to_string())),
            })?;
        Ok(Self::with_config(inner, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::codec::{decode_frame, MAX_MSG};

    fn written(writer: FrameWriter<Cursor<Vec<u8>>>) -> BytesMut {
        BytesMut::from(writer.into_inner().into_inner().as_slice())
    }

    #[test]
    fn write_single_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(b"hello").unwrap();

        let mut wire = written(writer);
        let frame = decode_frame(&mut wire, MAX_MSG).unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"hello");
        assert!(wire.is_empty());
    }

    #[test]
    fn write_multiple_frames() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(b"one").unwrap();
        writer.send(b"two").unwrap();
        writer.write_frame(&Frame::new("three")).unwrap();

        let mut wire = written(writer);
        let f1 = decode_frame(&mut wire, MAX_MSG).unwrap().unwrap();
        let f2 = decode_frame(&mut wire, MAX_MSG).unwrap().unwrap();
        let f3 = decode_frame(&mut wire, MAX_MSG).unwrap().unwrap();

        assert_eq!(f1.payload.as_ref(), b"one");
        assert_eq!(f2.payload.as_ref(), b"two");
        assert_eq!(f3.payload.as_ref(), b"three");
    }

    #[test]
    fn payload_too_large_rejected_before_writing() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        let err = writer.send(&vec![b'x'; MAX_MSG + 1]).unwrap_err();
        assert!(matches!(err, FrameError::OversizedPayload { .. }));
        assert!(written(writer).is_empty());
    }

    #[test]
    fn configured_limit_applies() {
        let cfg = FrameConfig {
            max_payload_size: 4,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(Cursor::new(Vec::<u8>::new()), cfg);

        let err = writer.send(b"oversized").unwrap_err();
        assert!(matches!(err, FrameError::OversizedPayload { size: 9, max: 4 }));

        writer.set_max_payload_size(16);
        writer.send(b"oversized").unwrap();
        assert_eq!(writer.config().max_payload_size, 16);
    }

    #[test]
    fn one_byte_writes_still_deliver_frame() {
        let mut writer = FrameWriter::new(OneByteWriter::default());
        writer.send(b"Hello 1").unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data, b"\x00\x00\x00\x07Hello 1");
        assert_eq!(inner.calls, HEADER_SIZE + 7);
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.send(b"x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(b"x").unwrap_err();
        assert!(matches!(err, FrameError::TransportWrite(e) if e.kind() == ErrorKind::WriteZero));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    #[test]
    fn written_bytes_decode_with_reader() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(b"z").unwrap();

        let wire = writer.into_inner().into_inner();
        let mut framed = crate::reader::FrameReader::new(Cursor::new(wire));
        let frame = framed.read_frame().unwrap();
        assert_eq!(frame.payload.as_ref(), b"z");
    }

    #[derive(Default)]
    struct OneByteWriter {
        data: Vec<u8>,
        calls: usize,
    }

    impl Write for OneByteWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.calls += 1;
            self.data.push(buf[0]);
            Ok(1)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn roundtrip_over_tcp_stream() {
        let listener = lenframe_transport::TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();

        let server = std::thread::spawn(move || {
            let stream = listener.accept().unwrap();
            let mut reader = crate::reader::FrameReader::new(stream);
            reader.read_frame().unwrap()
        });

        let stream = lenframe_transport::TcpTransport::connect(&addr).unwrap();
        let cfg = FrameConfig {
            write_timeout: Some(std::time::Duration::from_secs(5)),
            max_payload_size: 8,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config_stream(stream, cfg).unwrap();
        assert_eq!(writer.config().max_payload_size, 8);
        assert!(matches!(
            writer.send(b"too long!"),
            Err(FrameError::OversizedPayload { size: 9, max: 8 })
        ));
        writer.send(b"tcp").unwrap();

        let frame = server.join().unwrap();
        assert_eq!(frame.payload.as_ref(), b"tcp");
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
