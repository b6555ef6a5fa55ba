use {
    crate::ComError,
    lookout_codec::Codec,
    tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
};

/// Width of the length prefix. Fixed on every platform.
pub const LENGTH_PREFIX_SIZE: usize = 8;

pub const MAX_MESSAGE_SIZE: u64 = 64 * 1024 * 1024; // 64 MB

const READ_CHUNK_SIZE: usize = 4096;

/// Encode `value` as one wire message: an 8-byte little-endian payload length
/// followed by the payload.
///
/// Returns `ComError::MessageTooLarge` if the payload exceeds `MAX_MESSAGE_SIZE`.
pub fn encode_message<T: Codec>(value: &T) -> Result<Vec<u8>, ComError> {
    let mut buf = vec![0u8; LENGTH_PREFIX_SIZE];
    value.encode(&mut buf);

    let len = (buf.len() - LENGTH_PREFIX_SIZE) as u64;
    if len > MAX_MESSAGE_SIZE {
        return Err(ComError::MessageTooLarge(len));
    }

    buf[..LENGTH_PREFIX_SIZE].copy_from_slice(&len.to_le_bytes());
    Ok(buf)
}

/// Total size (prefix included) of the message at the front of `buffer`, once
/// its prefix is complete.
fn message_len(buffer: &[u8]) -> Result<Option<usize>, ComError> {
    let Some(prefix) = buffer.first_chunk::<LENGTH_PREFIX_SIZE>() else {
        return Ok(None);
    };
    let len = u64::from_le_bytes(*prefix);
    if len > MAX_MESSAGE_SIZE {
        return Err(ComError::MessageTooLarge(len));
    }
    Ok(Some(LENGTH_PREFIX_SIZE + len as usize))
}

/// Remove one complete message from the front of `buffer` and return its
/// payload.
///
/// Returns `Ok(None)` and leaves `buffer` untouched while it holds less than one
/// full message. Bytes after the message stay in `buffer` for the next call.
/// A declared length above `MAX_MESSAGE_SIZE` is rejected as soon as the prefix
/// is complete, before any payload is awaited.
pub fn split_message(buffer: &mut Vec<u8>) -> Result<Option<Vec<u8>>, ComError> {
    let Some(total) = message_len(buffer)? else {
        return Ok(None);
    };
    if buffer.len() < total {
        return Ok(None);
    }

    let rest = buffer.split_off(total);
    let mut payload = std::mem::replace(buffer, rest);
    payload.drain(..LENGTH_PREFIX_SIZE);
    Ok(Some(payload))
}

/// Write one length-prefixed message to an async writer.
///
/// The prefix and payload go out in a single `write_all`; the call returns once
/// every byte has been handed to the writer.
pub async fn write_message<T: Codec, W: AsyncWrite + Unpin>(
    writer: &mut W,
    value: &T,
) -> Result<(), ComError> {
    let message = encode_message(value)?;
    writer.write_all(&message).await?;
    Ok(())
}

/// Reassembles length-prefixed messages from a byte stream that may deliver
/// data in chunks of any size.
///
/// Bytes read past the end of one message are kept and used by the next read,
/// so a reader must stay with its connection for that connection's lifetime.
pub struct MessageReader<R> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
        }
    }

    /// Bytes received but not yet returned as part of a message.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Read until one full message is available and return its payload.
    ///
    /// Returns `ComError::ConnectionClosed` if the stream ends between messages
    /// and `ComError::Truncated` if it ends inside one.
    pub async fn read_payload(&mut self) -> Result<Vec<u8>, ComError> {
        loop {
            if let Some(payload) = split_message(&mut self.buffer)? {
                return Ok(payload);
            }
            self.fill().await?;
        }
    }

    /// Read one message and decode it as `T`.
    pub async fn read_message<T: Codec>(&mut self) -> Result<T, ComError> {
        let payload = self.read_payload().await?;
        T::from_bytes(&payload).map_err(ComError::from)
    }

    async fn fill(&mut self) -> Result<(), ComError> {
        // once the size is known, make room for the whole message at once
        let wanted = match message_len(&self.buffer)? {
            Some(total) => total - self.buffer.len(),
            None => READ_CHUNK_SIZE,
        };
        self.buffer.reserve(wanted.max(READ_CHUNK_SIZE));

        let n = self.reader.read_buf(&mut self.buffer).await?;
        if n == 0 {
            return Err(self.eof_error());
        }
        Ok(())
    }

    fn eof_error(&self) -> ComError {
        if self.buffer.is_empty() {
            return ComError::ConnectionClosed;
        }
        let expected = match message_len(&self.buffer) {
            Ok(Some(total)) => total,
            _ => LENGTH_PREFIX_SIZE,
        };
        ComError::Truncated {
            expected: expected as u64,
            received: self.buffer.len() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(payload: &[u8]) -> Vec<u8> {
        let mut bytes = (payload.len() as u64).to_le_bytes().to_vec();
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_split_waits_for_prefix() {
        let mut buffer = vec![3, 0, 0];
        assert!(split_message(&mut buffer).unwrap().is_none());
        assert_eq!(buffer, vec![3, 0, 0]);
    }

    #[test]
    fn test_split_waits_for_payload() {
        let mut buffer = message(b"abc");
        buffer.pop();
        let before = buffer.clone();
        assert!(split_message(&mut buffer).unwrap().is_none());
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_split_keeps_leftover() {
        let mut buffer = message(b"abc");
        buffer.extend_from_slice(&message(b"de"));
        buffer.extend_from_slice(&[9, 9]);

        assert_eq!(split_message(&mut buffer).unwrap().unwrap(), b"abc");
        assert_eq!(split_message(&mut buffer).unwrap().unwrap(), b"de");
        assert!(split_message(&mut buffer).unwrap().is_none());
        assert_eq!(buffer, vec![9, 9]);
    }

    #[test]
    fn test_split_empty_payload() {
        let mut buffer = message(b"");
        assert_eq!(split_message(&mut buffer).unwrap().unwrap(), Vec::<u8>::new());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_split_rejects_oversized_prefix() {
        let mut buffer = (MAX_MESSAGE_SIZE + 1).to_le_bytes().to_vec();
        match split_message(&mut buffer) {
            Err(ComError::MessageTooLarge(len)) => assert_eq!(len, MAX_MESSAGE_SIZE + 1),
            other => panic!("Expected MessageTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_message_prefix() {
        let bytes = encode_message(&7u8).unwrap();
        assert_eq!(bytes, vec![1, 0, 0, 0, 0, 0, 0, 0, 7]);
    }
}
