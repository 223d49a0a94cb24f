//! `tokio_util::codec` adapter for the packet wire format.
//!
//! The decoder yields every extraction [`Outcome`] as an item instead of
//! returning an error for a malformed frame, so one corrupt frame never
//! terminates a `FramedRead` stream. `Outcome::Incomplete` is never yielded.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::assembler::Outcome;
use crate::codec::{encode_packet, take_frame};
use crate::error::FrameError;
use crate::packet::Packet;

#[derive(Debug, Default, Clone, Copy)]
pub struct PacketCodec;

impl PacketCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for PacketCodec {
    type Item = Outcome;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Ok(take_frame(src))
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_packet(&item, dst);
        Ok(())
    }
}

impl Encoder<&Packet> for PacketCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_packet(item, dst);
        Ok(())
    }
}
