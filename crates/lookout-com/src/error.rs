use lookout_codec::DecodeError;
use lookout_video::CaptureError;
use std::fmt;

/// Broad class of a [`ComError`], used to pick a recovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The connection failed or closed. Reconnecting may help.
    Transport,
    /// The byte stream cannot be trusted any more. The connection must go.
    Protocol,
    /// The frame source failed.
    Capture,
}

#[derive(Debug)]
pub enum ComError {
    Io(std::io::Error),
    /// The peer closed the connection on a message boundary.
    ConnectionClosed,
    /// The peer closed the connection in the middle of a message.
    Truncated { expected: u64, received: u64 },
    MessageTooLarge(u64),
    Decode(DecodeError),
    Capture(CaptureError),
}

impl ComError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ComError::Io(_) | ComError::ConnectionClosed => ErrorKind::Transport,
            ComError::Truncated { .. } | ComError::MessageTooLarge(_) | ComError::Decode(_) => {
                ErrorKind::Protocol
            }
            ComError::Capture(_) => ErrorKind::Capture,
        }
    }
}

impl fmt::Display for ComError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComError::Io(err) => write!(f, "io error: {err}"),
            ComError::ConnectionClosed => write!(f, "connection closed"),
            ComError::Truncated { expected, received } => write!(
                f,
                "connection closed mid-message: expected {expected} bytes, received {received}"
            ),
            ComError::MessageTooLarge(len) => write!(f, "message too large: {len} bytes"),
            ComError::Decode(err) => write!(f, "decode error: {err}"),
            ComError::Capture(err) => write!(f, "capture error: {err}"),
        }
    }
}

impl std::error::Error for ComError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ComError::Io(err) => Some(err),
            ComError::Decode(err) => Some(err),
            ComError::Capture(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ComError {
    fn from(err: std::io::Error) -> Self {
        ComError::Io(err)
    }
}

impl From<DecodeError> for ComError {
    fn from(err: DecodeError) -> Self {
        ComError::Decode(err)
    }
}

impl From<CaptureError> for ComError {
    fn from(err: CaptureError) -> Self {
        ComError::Capture(err)
    }
}
