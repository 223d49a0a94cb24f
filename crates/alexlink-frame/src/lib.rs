//! Fixed-size packet framing for the alexlink serial protocol.
//!
//! Every packet travels as one 76-byte frame:
//! - A 1-byte magic marker (`0xFC`) for stream alignment
//! - 1-byte packet kind and 1-byte command/response code
//! - Ten 4-byte little-endian parameters
//! - A 32-byte zero-filled text field
//! - A 1-byte XOR checksum over everything before it
//!
//! Frames are not self-delimiting by content, so a frame that fails
//! validation is dropped whole and the next 76 bytes are tried afresh.

pub mod assembler;
pub mod codec;
pub mod error;
pub mod packet;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

pub use assembler::{FrameAssembler, Outcome};
pub use codec::{checksum, decode_frame, encode_packet, serialize, FRAME_SIZE, MAGIC};
pub use error::{FrameError, Result};
pub use packet::{CommandCode, Packet, PacketKind, ResponseCode, PARAM_COUNT, TEXT_CAPACITY};
pub use reader::PacketReader;
pub use writer::PacketWriter;

#[cfg(feature = "async")]
pub use async_codec::PacketCodec;
