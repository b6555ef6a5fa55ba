use crate::{Codec, DecodeError};

/// Take exactly `n` bytes from `buf` at `pos`, advancing `pos`.
pub fn read_bytes<'a>(buf: &'a [u8], pos: &mut usize, n: usize) -> Result<&'a [u8], DecodeError> {
    let end = pos.checked_add(n).ok_or(DecodeError::UnexpectedEof)?;
    if end > buf.len() {
        return Err(DecodeError::UnexpectedEof);
    }
    let slice = &buf[*pos..end];
    *pos = end;
    Ok(slice)
}

/// Append a `u32` length followed by the raw bytes.
pub fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    (bytes.len() as u32).encode(buf);
    buf.extend_from_slice(bytes);
}

/// Inverse of [`encode_bytes`]; borrows from `buf`.
pub fn decode_bytes<'a>(buf: &'a [u8], pos: &mut usize) -> Result<&'a [u8], DecodeError> {
    let len = u32::decode(buf, pos)? as usize;
    read_bytes(buf, pos, len)
}

macro_rules! impl_codec_for_numeric {
    ($($ty:ty),*) => {
        $(
            impl Codec for $ty {
                fn encode(&self, buf: &mut Vec<u8>) {
                    buf.extend_from_slice(&self.to_le_bytes());
                }

                fn decode(buf: &[u8], pos: &mut usize) -> Result<Self, DecodeError> {
                    const SIZE: usize = std::mem::size_of::<$ty>();
                    let mut bytes = [0u8; SIZE];
                    bytes.copy_from_slice(read_bytes(buf, pos, SIZE)?);
                    Ok(<$ty>::from_le_bytes(bytes))
                }
            }
        )*
    };
}

impl_codec_for_numeric!(u8, u32, u64);
