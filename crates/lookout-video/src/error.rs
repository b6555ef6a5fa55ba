use std::fmt;

#[derive(Debug)]
pub enum CaptureError {
    /// The device could not be opened or configured.
    Device(String),
    /// The source reports that it cannot produce frames right now.
    Unavailable,
    /// The source has no more frames to give.
    Exhausted,
    /// The capture stream failed mid-run.
    Stream(String),
    /// Pixel data does not match the declared frame shape.
    Shape(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Device(msg) => write!(f, "device error: {msg}"),
            CaptureError::Unavailable => write!(f, "capture source unavailable"),
            CaptureError::Exhausted => write!(f, "capture source exhausted"),
            CaptureError::Stream(msg) => write!(f, "stream error: {msg}"),
            CaptureError::Shape(msg) => write!(f, "shape error: {msg}"),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Device(err.to_string())
    }
}
