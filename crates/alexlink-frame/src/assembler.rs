//! Incremental frame assembly from arbitrarily chunked input.

use bytes::BytesMut;
use tracing::{debug, trace};

use crate::codec::{take_frame, FRAME_SIZE};
use crate::packet::Packet;

/// Result of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A validated packet.
    Complete(Packet),
    /// Fewer than one frame's worth of bytes is buffered. Nothing was consumed.
    Incomplete,
    /// The frame did not start with the magic marker and was dropped.
    BadMagic { found: u8 },
    /// The frame's checksum did not match and it was dropped.
    BadChecksum { computed: u8, received: u8 },
}

impl Outcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Whether this outcome is a per-frame validation failure.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::BadMagic { .. } | Self::BadChecksum { .. })
    }
}

/// Reassembles frames from bytes arriving in chunks of any size.
///
/// Each [`feed`](Self::feed) appends its input and then extracts at most
/// one frame. When a chunk carries more than one frame, the remainder stays
/// buffered and [`has_frame`](Self::has_frame) reports it; callers drain it
/// with [`poll`](Self::poll) before reading more input.
///
/// A frame that fails validation is discarded whole. Frames are fixed-size
/// and carry no delimiter, so there is no byte-level resynchronisation.
#[derive(Debug)]
pub struct FrameAssembler {
    buf: BytesMut,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(FRAME_SIZE * 2),
        }
    }

    /// Append `bytes` and try to extract one frame.
    pub fn feed(&mut self, bytes: &[u8]) -> Outcome {
        if !bytes.is_empty() {
            trace!(len = bytes.len(), buffered = self.buf.len(), "feeding bytes");
            self.buf.extend_from_slice(bytes);
        }
        self.poll()
    }

    /// Try to extract one frame from bytes already buffered.
    pub fn poll(&mut self) -> Outcome {
        match take_frame(&mut self.buf) {
            Some(outcome) => {
                if outcome.is_fault() {
                    debug!(?outcome, remaining = self.buf.len(), "dropped malformed frame");
                }
                outcome
            }
            None => Outcome::Incomplete,
        }
    }

    /// Whether a full frame is already buffered.
    pub fn has_frame(&self) -> bool {
        self.buf.len() >= FRAME_SIZE
    }

    /// Number of bytes waiting for extraction.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Discard everything buffered.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
