use std::io::{Cursor, ErrorKind, Read, Write};

use bytes::{BufMut, BytesMut};
use lenframe_frame::encode_frame_with_limit;

/// In-memory peer: serves pre-encoded response bytes and records writes.
pub(crate) struct ScriptedStream {
    pub responses: Cursor<Vec<u8>>,
    pub written: Vec<u8>,
    pub write_calls: usize,
    /// 1-based write call that fails with `BrokenPipe`.
    pub fail_write_on: Option<usize>,
}

impl ScriptedStream {
    pub fn new(responses: Vec<u8>) -> Self {
        Self {
            responses: Cursor::new(responses),
            written: Vec::new(),
            write_calls: 0,
            fail_write_on: None,
        }
    }

    pub fn replying(payloads: &[&[u8]]) -> Self {
        let mut wire = BytesMut::new();
        for payload in payloads {
            encode_frame_with_limit(payload, usize::MAX, &mut wire).unwrap();
        }
        Self::new(wire.to_vec())
    }

    pub fn with_raw_header(len: u32, body: &[u8]) -> Self {
        let mut wire = BytesMut::new();
        wire.put_u32(len);
        wire.put_slice(body);
        Self::new(wire.to_vec())
    }

    pub fn bytes_read(&self) -> u64 {
        self.responses.position()
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.responses.read(buf)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.write_calls += 1;
        if self.fail_write_on == Some(self.write_calls) {
            return Err(std::io::Error::from(ErrorKind::BrokenPipe));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
