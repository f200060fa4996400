use super::{
    error::{ProtoError, Result, debug_log_error},
    varint::{read_varint, read_varint_partial, varint_len, write_varint},
};

/// Maximum packet length in bytes (protocol limit).
pub const MAX_PACKET_SIZE: usize = 2_097_152;

/// Clientbound or serverbound packet body encoding.
pub trait PacketEncode {
    const ID: u32;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()>;
}

/// Clientbound or serverbound packet body decoding.
pub trait PacketDecode<'a>: Sized {
    const ID: u32;

    fn decode_body(input: &mut &'a [u8]) -> Result<Self>;
}

/// Decoded packet frame with the raw body (without ID).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketFrame {
    pub id: u32,
    pub body: Vec<u8>,
}

impl PacketFrame {
    /// Strips the outer length prefix and packet id from the front of `data`.
    ///
    /// Returns the frame and the number of bytes it occupied, or `None` when
    /// `data` does not yet hold the whole frame.
    pub fn parse(data: &[u8]) -> Result<Option<(PacketFrame, usize)>> {
        let (packet_len, len_len) = match read_varint_partial(data) {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(None),
            Err(err) => {
                debug_log_error("packet length varint decode failed", &err);
                return Err(err);
            }
        };

        let packet_len = packet_len as usize;
        if packet_len > MAX_PACKET_SIZE {
            let err = ProtoError::PacketTooLarge { len: packet_len };
            debug_log_error("packet too large", &err);
            return Err(err);
        }

        let total_len = len_len + packet_len;
        if data.len() < total_len {
            return Ok(None);
        }

        let mut body = &data[len_len..total_len];
        let id = match read_varint(&mut body) {
            Ok(value) => value,
            Err(err) => {
                debug_log_error("packet id varint decode failed", &err);
                return Err(err);
            }
        };

        Ok(Some((
            PacketFrame {
                id,
                body: body.to_vec(),
            },
            total_len,
        )))
    }

    /// Decodes the body as `P`, rejecting a mismatched id or leftover bytes.
    pub fn decode<'a, P: PacketDecode<'a>>(&'a self) -> Result<P> {
        if self.id != P::ID {
            return Err(ProtoError::InvalidPacketId {
                expected: P::ID,
                actual: self.id,
            });
        }

        let mut input = self.body.as_slice();
        let packet = P::decode_body(&mut input)?;
        if !input.is_empty() {
            let err = ProtoError::TrailingBytes(input.len());
            debug_log_error("packet had trailing bytes", &err);
            return Err(err);
        }
        Ok(packet)
    }
}

/// Packet encoder for length-prefixed frames.
pub struct PacketEncoder {
    buf: Vec<u8>,
    scratch: Vec<u8>,
}

impl Default for PacketEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketEncoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            scratch: Vec::new(),
        }
    }

    pub fn write_packet<P: PacketEncode>(&mut self, pkt: &P) -> Result<()> {
        self.scratch.clear();
        pkt.encode_body(&mut self.scratch)?;
        encode_raw_packet(&mut self.buf, P::ID, &self.scratch)
    }

    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

pub fn encode_packet<P: PacketEncode>(out: &mut Vec<u8>, pkt: &P) -> Result<()> {
    let mut body = Vec::new();
    pkt.encode_body(&mut body)?;
    encode_raw_packet(out, P::ID, &body)
}

/// Frames the packet id followed by `body` behind a varint length prefix.
pub fn encode_raw_packet(out: &mut Vec<u8>, id: u32, body: &[u8]) -> Result<()> {
    let packet_len = varint_len(id) + body.len();
    if packet_len > MAX_PACKET_SIZE {
        return Err(ProtoError::PacketTooLarge { len: packet_len });
    }

    write_varint(out, packet_len as u32);
    write_varint(out, id);
    out.extend_from_slice(body);
    Ok(())
}
