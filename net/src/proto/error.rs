/// Wire-level decode/encode error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtoError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("varint is longer than 5 bytes")]
    VarIntTooLarge,
    #[error("packet of {len} bytes exceeds the protocol limit")]
    PacketTooLarge { len: usize },
    #[error("invalid utf-8 in string field")]
    InvalidUtf8,
    #[error("string of {actual} chars exceeds limit of {max}")]
    StringTooLong { max: usize, actual: usize },
    #[error("length prefix {actual} exceeds limit of {max}")]
    LengthTooLarge { max: usize, actual: usize },
    #[error("{0} trailing bytes after packet body")]
    TrailingBytes(usize),
    #[error("unexpected packet id {actual:#04x}, expected {expected:#04x}")]
    InvalidPacketId { expected: u32, actual: u32 },
    #[error("invalid handshake next state {0}")]
    InvalidHandshakeState(u32),
}

pub type Result<T> = std::result::Result<T, ProtoError>;

pub(crate) fn debug_log_error(context: &str, error: &ProtoError) {
    #[cfg(debug_assertions)]
    {
        log::error!("{}: {:?}", context, error);
    }
    let _ = context;
    let _ = error;
}
