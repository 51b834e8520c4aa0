use crate::sqlite::error::DecodeError;

/// Longest encoding of a varint in bytes
pub const MAX_VARINT_LEN: usize = 9;

/// Utility functions for handling SQLite variable-length integers (varints)
///
/// A varint is 1-9 bytes, most significant group first. The first eight bytes
/// carry 7 bits each with the high bit set when another byte follows; a ninth
/// byte, if reached, contributes all 8 bits.
pub trait Varint {
    /// Decodes the varint starting at `offset`, returning its value and encoded size
    fn read_varint(&self, offset: usize) -> Result<(u64, usize), DecodeError>;
}

impl Varint for [u8] {
    fn read_varint(&self, offset: usize) -> Result<(u64, usize), DecodeError> {
        let mut result = 0u64;

        for i in 0..MAX_VARINT_LEN {
            let byte = *self
                .get(offset + i)
                .ok_or(DecodeError::TruncatedVarint { offset })?;

            if i == MAX_VARINT_LEN - 1 {
                return Ok(((result << 8) | byte as u64, MAX_VARINT_LEN));
            }

            result = (result << 7) | (byte & 0x7f) as u64;
            if byte & 0x80 == 0 {
                return Ok((result, i + 1));
            }
        }

        unreachable!("the ninth byte always terminates a varint")
    }
}
