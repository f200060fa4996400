use std::io::{self, Read};

use crate::proto::{
    MAX_PACKET_SIZE, MAX_STATUS_JSON_CHARS, MAX_VARINT_LEN, ProtoError, max_string_bytes,
    push_varint_byte,
};

use super::error::{DecodeError, QueryError};

/// Outer framing of an inbound packet. The reader is left at the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Declared byte length of the packet id followed by its payload.
    pub length: u32,
    pub id: u32,
}

/// Fills `buf` completely, however the source chooses to split its reads.
fn fill<R: Read + ?Sized>(src: &mut R, buf: &mut [u8]) -> io::Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("peer closed after {filled} of {} bytes", buf.len()),
                ));
            }
            Ok(read) => filled += read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Reads exactly `n` bytes, accumulating as many partial reads as it takes.
///
/// The caller bounds `n`; this allocates the whole buffer up front.
pub fn read_exact<R: Read + ?Sized>(src: &mut R, n: usize) -> Result<Vec<u8>, QueryError> {
    let mut buf = vec![0u8; n];
    fill(src, &mut buf)?;
    Ok(buf)
}

/// Reads one varint a byte at a time.
pub fn read_varint<R: Read + ?Sized>(src: &mut R) -> Result<u32, QueryError> {
    let mut value = 0;
    let mut byte = [0u8; 1];
    for index in 0..MAX_VARINT_LEN {
        fill(src, &mut byte)?;
        if push_varint_byte(&mut value, index, byte[0]) {
            return Ok(value);
        }
    }

    Err(ProtoError::VarIntTooLarge.into())
}

/// Reads the outer length and packet id of the next inbound packet.
///
/// The length is reported as-is; it is not checked against what the payload
/// readers consume afterwards.
pub fn read_frame_header<R: Read + ?Sized>(src: &mut R) -> Result<FrameHeader, QueryError> {
    let length = read_varint(src)?;
    if length as usize > MAX_PACKET_SIZE {
        return Err(ProtoError::PacketTooLarge {
            len: length as usize,
        }
        .into());
    }

    let id = read_varint(src)?;
    Ok(FrameHeader { length, id })
}

/// Reads the varint-prefixed JSON string that makes up a status response body.
pub fn read_status_json<R: Read + ?Sized>(src: &mut R) -> Result<String, QueryError> {
    let byte_len = read_varint(src)? as usize;
    let max_bytes = max_string_bytes(MAX_STATUS_JSON_CHARS);
    if byte_len > max_bytes {
        return Err(ProtoError::LengthTooLarge {
            max: max_bytes,
            actual: byte_len,
        }
        .into());
    }

    let bytes = read_exact(src, byte_len)?;
    String::from_utf8(bytes).map_err(|err| DecodeError::Utf8(err.utf8_error()).into())
}
