use super::{
    error::{ProtoError, Result},
    io::{read_string_bounded, read_u16_be, write_string_bounded, write_u16_be},
    state::HandshakeNextState,
    types::{PacketDecode, PacketEncode},
    varint::{read_varint, write_varint},
};

/// Longest server address the handshake accepts, in UTF-16 units.
pub const MAX_ADDRESS_CHARS: usize = 255;

/// Longest status JSON document, in UTF-16 units.
pub const MAX_STATUS_JSON_CHARS: usize = 32_767;

/// Handshake (C2S) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeC2s<'a> {
    pub protocol_version: u32,
    pub server_address: &'a str,
    pub server_port: u16,
    pub next_state: HandshakeNextState,
}

/// Status request (C2S) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRequestC2s;

/// Status response (S2C) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusResponseS2c<'a> {
    pub json: &'a str,
}

impl<'a> HandshakeC2s<'a> {
    pub const ID: u32 = 0x00;

    pub fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        let protocol_version = read_varint(input)?;
        let server_address = read_string_bounded(input, MAX_ADDRESS_CHARS)?;
        let server_port = read_u16_be(input)?;
        let next_state = match read_varint(input)? {
            1 => HandshakeNextState::Status,
            2 => HandshakeNextState::Login,
            other => return Err(ProtoError::InvalidHandshakeState(other)),
        };

        Ok(Self {
            protocol_version,
            server_address,
            server_port,
            next_state,
        })
    }
}

impl<'a> PacketDecode<'a> for HandshakeC2s<'a> {
    const ID: u32 = HandshakeC2s::ID;

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        HandshakeC2s::decode_body(input)
    }
}

impl<'a> PacketEncode for HandshakeC2s<'a> {
    const ID: u32 = HandshakeC2s::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_varint(out, self.protocol_version);
        write_string_bounded(out, self.server_address, MAX_ADDRESS_CHARS)?;
        write_u16_be(out, self.server_port);
        write_varint(out, self.next_state.as_varint());
        Ok(())
    }
}

impl StatusRequestC2s {
    pub const ID: u32 = 0x00;
}

impl<'a> PacketDecode<'a> for StatusRequestC2s {
    const ID: u32 = StatusRequestC2s::ID;

    fn decode_body(_input: &mut &'a [u8]) -> Result<Self> {
        Ok(Self)
    }
}

impl PacketEncode for StatusRequestC2s {
    const ID: u32 = StatusRequestC2s::ID;

    fn encode_body(&self, _out: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }
}

impl<'a> StatusResponseS2c<'a> {
    pub const ID: u32 = 0x00;

    pub fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        Ok(Self {
            json: read_string_bounded(input, MAX_STATUS_JSON_CHARS)?,
        })
    }
}

impl<'a> PacketDecode<'a> for StatusResponseS2c<'a> {
    const ID: u32 = StatusResponseS2c::ID;

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        StatusResponseS2c::decode_body(input)
    }
}

impl<'a> PacketEncode for StatusResponseS2c<'a> {
    const ID: u32 = StatusResponseS2c::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_string_bounded(out, self.json, MAX_STATUS_JSON_CHARS)
    }
}
