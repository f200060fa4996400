//! Minimal Minecraft protocol framing for the handshake and status exchange.

mod error;
mod io;
mod packets;
mod state;
mod types;
mod varint;

#[cfg(test)]
mod tests;

pub use error::{ProtoError, Result};
pub use io::max_string_bytes;
pub use packets::{
    HandshakeC2s, MAX_ADDRESS_CHARS, MAX_STATUS_JSON_CHARS, StatusRequestC2s, StatusResponseS2c,
};
pub use state::HandshakeNextState;
pub use types::{
    MAX_PACKET_SIZE, PacketDecode, PacketEncode, PacketEncoder, PacketFrame, encode_packet,
    encode_raw_packet,
};
pub use varint::{
    MAX_VARINT_LEN, push_varint_byte, read_varint, read_varint_partial, varint_len, write_varint,
};
