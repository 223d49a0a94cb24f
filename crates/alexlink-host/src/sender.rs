use std::io::Write;
use std::sync::{Arc, Mutex};

use alexlink_frame::{Packet, PacketWriter};
use tracing::debug;

use crate::command::Command;
use crate::error::{HostError, Result};

/// Fire-and-forget packet sender.
///
/// Clones share one writer behind a mutex, so whole frames go out one at a
/// time no matter how many threads send. Sending never touches the read
/// half of the link.
pub struct Sender<W> {
    writer: Arc<Mutex<PacketWriter<W>>>,
}

impl<W> Clone for Sender<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
        }
    }
}

impl<W: Write> Sender<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(PacketWriter::new(inner))),
        }
    }

    /// Serialize and write one packet. Returns once the bytes are flushed;
    /// no acknowledgement is awaited.
    pub fn send(&self, packet: &Packet) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| HostError::Poisoned("packet writer"))?;
        writer.send(packet)?;
        debug!(kind = packet.kind.name(), code = packet.code, "packet sent");
        Ok(())
    }

    /// Send the packet for `command`.
    pub fn send_command(&self, command: Command) -> Result<()> {
        debug!(command = command.name(), "sending command");
        self.send(&command.to_packet())
    }
}
