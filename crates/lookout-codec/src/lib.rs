//! Little-endian binary encoding shared by every message that crosses the
//! camera link.

mod primitives;

pub use primitives::{decode_bytes, encode_bytes, read_bytes};

use std::fmt;

#[derive(Debug, PartialEq)]
pub enum DecodeError {
    UnexpectedEof,
    /// A value decoded cleanly but broke an invariant of its type.
    Invalid(String),
    /// The value ended before the buffer did.
    TrailingBytes(usize),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEof => write!(f, "unexpected end of buffer"),
            DecodeError::Invalid(msg) => write!(f, "invalid value: {msg}"),
            DecodeError::TrailingBytes(n) => write!(f, "{n} trailing bytes after value"),
        }
    }
}

impl std::error::Error for DecodeError {}

pub trait Codec: Sized {
    fn encode(&self, buf: &mut Vec<u8>);
    fn decode(buf: &[u8], pos: &mut usize) -> Result<Self, DecodeError>;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }

    /// Decode a value that must occupy all of `bytes`.
    fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut pos = 0;
        let value = Self::decode(bytes, &mut pos)?;
        if pos != bytes.len() {
            return Err(DecodeError::TrailingBytes(bytes.len() - pos));
        }
        Ok(value)
    }
}
