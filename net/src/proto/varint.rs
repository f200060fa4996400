use super::error::{ProtoError, Result};

/// Longest encoding of a 32-bit varint.
pub const MAX_VARINT_LEN: usize = 5;

/// Folds the `index`-th byte of a varint into `value`. Returns true once
/// `byte` is the terminating one.
#[inline]
pub fn push_varint_byte(value: &mut u32, index: usize, byte: u8) -> bool {
    *value |= u32::from(byte & 0x7f) << (index * 7);
    byte & 0x80 == 0
}

#[inline]
pub fn read_varint(input: &mut &[u8]) -> Result<u32> {
    let Some((value, len)) = read_varint_partial(input)? else {
        return Err(ProtoError::UnexpectedEof);
    };
    *input = &input[len..];
    Ok(value)
}

/// Decodes a varint from the front of `input`, returning `None` while the
/// terminating byte has not arrived yet.
#[inline]
pub fn read_varint_partial(input: &[u8]) -> Result<Option<(u32, usize)>> {
    let mut value = 0;
    for (index, &byte) in input.iter().take(MAX_VARINT_LEN).enumerate() {
        if push_varint_byte(&mut value, index, byte) {
            return Ok(Some((value, index + 1)));
        }
    }

    if input.len() < MAX_VARINT_LEN {
        Ok(None)
    } else {
        Err(ProtoError::VarIntTooLarge)
    }
}

#[inline]
pub fn write_varint(out: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        out.push(value as u8 | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

#[inline]
pub fn varint_len(value: u32) -> usize {
    match value {
        0..=0x7f => 1,
        0x80..=0x3fff => 2,
        0x4000..=0x1f_ffff => 3,
        0x20_0000..=0xfff_ffff => 4,
        _ => 5,
    }
}
