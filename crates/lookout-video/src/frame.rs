use crate::CaptureError;
use lookout_codec::{Codec, DecodeError, decode_bytes, encode_bytes};
use std::fmt;

/// One captured image: `height` rows of `width` pixels, `channels` bytes per
/// pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

fn expected_len(width: u32, height: u32, channels: u8) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(channels as usize)
}

impl Frame {
    /// Wrap pixel data, checking it holds exactly `width * height * channels`
    /// bytes.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = expected_len(width, height, channels).ok_or_else(|| {
            CaptureError::Shape(format!("{width}x{height}x{channels} overflows"))
        })?;
        if data.len() != expected {
            return Err(CaptureError::Shape(format!(
                "{width}x{height}x{channels} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }


    /// Size of the encoded form of a `width` x `height` x `channels` frame,
    /// saturating at `u64::MAX`.
    pub fn encoded_len(width: u32, height: u32, channels: u8) -> u64 {
        (width as u64 * height as u64)
            .saturating_mul(channels as u64)
            .saturating_add(HEADER_SIZE as u64)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

// width u32 | height u32 | channels u8 | data (u32 length + bytes)
const HEADER_SIZE: usize = 4 + 4 + 1 + 4;

impl Codec for Frame {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.reserve(HEADER_SIZE + self.data.len());
        self.width.encode(buf);
        self.height.encode(buf);
        self.channels.encode(buf);
        encode_bytes(buf, &self.data);
    }

    fn decode(buf: &[u8], pos: &mut usize) -> Result<Self, DecodeError> {
        let width = u32::decode(buf, pos)?;
        let height = u32::decode(buf, pos)?;
        let channels = u8::decode(buf, pos)?;
        let data = decode_bytes(buf, pos)?.to_vec();
        Frame::new(width, height, channels, data).map_err(|e| DecodeError::Invalid(e.to_string()))
    }
}
