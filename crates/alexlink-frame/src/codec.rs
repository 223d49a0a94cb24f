use bytes::{Buf, BufMut, BytesMut};

use crate::assembler::Outcome;
use crate::packet::{Packet, PacketKind, PARAM_COUNT, TEXT_CAPACITY};

/// Frame alignment marker, always the first byte.
pub const MAGIC: u8 = 0xFC;

/// Bytes before the parameter block: magic + kind + code.
const HEADER_SIZE: usize = 3;

const PARAMS_SIZE: usize = PARAM_COUNT * 4;

/// Byte offset of the checksum trailer.
const CHECKSUM_OFFSET: usize = HEADER_SIZE + PARAMS_SIZE + TEXT_CAPACITY;

/// Wire size of every frame, whatever its kind.
pub const FRAME_SIZE: usize = CHECKSUM_OFFSET + 1;

/// XOR-fold of `bytes`.
///
/// Appending the result to `bytes` makes the whole sequence fold to zero.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Encode a packet into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────┬──────┬──────┬──────────────────┬────────────┬──────────┐
/// │ Magic │ Kind │ Code │ Params           │ Text       │ Checksum │
/// │ 0xFC  │ (1B) │ (1B) │ (10 × 4B LE)     │ (32B)      │ (1B XOR) │
/// └───────┴──────┴──────┴──────────────────┴────────────┴──────────┘
/// ```
pub fn encode_packet(packet: &Packet, dst: &mut BytesMut) {
    dst.reserve(FRAME_SIZE);
    let start = dst.len();
    dst.put_u8(MAGIC);
    dst.put_u8(packet.kind.as_u8());
    dst.put_u8(packet.code);
    for param in packet.params {
        dst.put_u32_le(param);
    }
    dst.put_slice(&packet.text);
    let sum = checksum(&dst[start..]);
    dst.put_u8(sum);
}

/// Serialize a packet into a standalone frame.
pub fn serialize(packet: &Packet) -> [u8; FRAME_SIZE] {
    let mut buf = BytesMut::with_capacity(FRAME_SIZE);
    encode_packet(packet, &mut buf);
    let mut frame = [0u8; FRAME_SIZE];
    frame.copy_from_slice(&buf);
    frame
}

/// Validate and decode exactly one frame.
///
/// Magic is checked before the checksum so that misaligned input is
/// reported as such rather than as corruption.
pub fn decode_frame(frame: &[u8; FRAME_SIZE]) -> Outcome {
    if frame[0] != MAGIC {
        return Outcome::BadMagic { found: frame[0] };
    }

    let computed = checksum(&frame[..CHECKSUM_OFFSET]);
    let received = frame[CHECKSUM_OFFSET];
    if computed != received {
        return Outcome::BadChecksum { computed, received };
    }

    let mut body = &frame[1..CHECKSUM_OFFSET];
    let kind = PacketKind::from_u8(body.get_u8());
    let code = body.get_u8();
    let mut params = [0u32; PARAM_COUNT];
    for param in params.iter_mut() {
        *param = body.get_u32_le();
    }
    let mut text = [0u8; TEXT_CAPACITY];
    body.copy_to_slice(&mut text);

    Outcome::Complete(Packet {
        kind,
        code,
        params,
        text,
    })
}

/// Take one frame off the front of `src` and decode it.
///
/// Returns `None` (consuming nothing) while fewer than [`FRAME_SIZE`] bytes
/// are buffered. Otherwise the frame's bytes are consumed whether or not
/// it validates.
pub(crate) fn take_frame(src: &mut BytesMut) -> Option<Outcome> {
    if src.len() < FRAME_SIZE {
        return None;
    }

    let mut frame = [0u8; FRAME_SIZE];
    src.copy_to_slice(&mut frame);
    Some(decode_frame(&frame))
}
