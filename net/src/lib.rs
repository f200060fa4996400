//! Minecraft Server List Ping: wire codec and a blocking status client.
pub mod proto;
pub mod slp;

pub use proto::{
    HandshakeC2s, HandshakeNextState, MAX_PACKET_SIZE, PacketDecode, PacketEncode, PacketEncoder,
    PacketFrame, ProtoError, StatusRequestC2s, StatusResponseS2c, encode_packet,
};
pub use slp::{
    CancelHandle, DEFAULT_PORT, DecodeError, Description, QueryError, QueryErrorKind, ServerAddress, SlpClient,
    StatusResponse, query,
};
