use std::io::Read;
use std::time::{Duration, Instant};

use alexlink_transport::is_idle_read;

use crate::assembler::{FrameAssembler, Outcome};
use crate::codec::FRAME_SIZE;
use crate::error::{FrameError, Result};
use crate::packet::Packet;

const READ_CHUNK_SIZE: usize = FRAME_SIZE * 4;

/// Reads packets from any `Read` stream.
///
/// Owns the assembly buffer. A read that returns zero bytes or times out
/// means the robot has not sent anything yet; it is never treated as
/// end-of-stream.
pub struct PacketReader<T> {
    inner: T,
    assembler: FrameAssembler,
}

impl<T: Read> PacketReader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            assembler: FrameAssembler::new(),
        }
    }

    /// Make one step of progress.
    ///
    /// Frames already buffered are extracted before the stream is read
    /// again. Returns `Ok(None)` when the stream had no data, otherwise the
    /// outcome of one extraction attempt (possibly `Incomplete`).
    pub fn poll(&mut self) -> Result<Option<Outcome>> {
        if self.assembler.has_frame() {
            return Ok(Some(self.assembler.poll()));
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let read = match self.inner.read(&mut chunk) {
            Ok(n) => n,
            Err(err) if is_idle_read(&err) => return Ok(None),
            Err(err) => return Err(FrameError::Io(err)),
        };

        if read == 0 {
            return Ok(None);
        }

        Ok(Some(self.assembler.feed(&chunk[..read])))
    }

    /// Block until one valid packet arrives or `timeout` elapses.
    ///
    /// Unlike [`poll`](Self::poll), a malformed frame is an error here. Used
    /// for request/response exchanges such as the hello handshake.
    pub fn read_packet(&mut self, timeout: Duration) -> Result<Packet> {
        // A timeout too large to represent as an instant never expires.
        let deadline = Instant::now().checked_add(timeout);
        loop {
            match self.poll()? {
                Some(Outcome::Complete(packet)) => return Ok(packet),
                Some(Outcome::BadMagic { found }) => {
                    return Err(FrameError::InvalidMagic { found })
                }
                Some(Outcome::BadChecksum { computed, received }) => {
                    return Err(FrameError::ChecksumMismatch { computed, received })
                }
                Some(Outcome::Incomplete) | None => {}
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(FrameError::Timeout(timeout));
            }
        }
    }

    /// Bytes held in the assembly buffer.
    pub fn buffered(&self) -> usize {
        self.assembler.buffered()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
