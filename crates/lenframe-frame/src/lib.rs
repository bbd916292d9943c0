//! Length-prefixed message framing for lenframe.
//!
//! Every message on the wire is a 4-byte big-endian payload length followed
//! by exactly that many payload bytes. Payloads are capped at [`MAX_MSG`]
//! bytes in both directions.
//!
//! [`write_all`] and [`read_full`] turn a stream's partial reads and writes
//! into exact-size transfers; [`FrameReader`] and [`FrameWriter`] build
//! whole-frame I/O on top of them.

pub mod codec;
pub mod error;
pub mod io;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod tokio_codec;

pub use codec::{
    decode_frame, decode_length, encode_frame, encode_frame_with_limit, validate_length, Frame,
    FrameConfig, HEADER_SIZE, MAX_MSG,
};
pub use error::{FrameError, Result};
pub use io::{read_full, write_all};
pub use reader::FrameReader;
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use tokio_codec::LengthCodec;
