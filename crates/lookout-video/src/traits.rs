use crate::{CaptureError, Frame};

/// Something that produces frames on demand: a camera, a file, a generator.
///
/// Frame shape must stay the same for the lifetime of one source.
#[allow(async_fn_in_trait)]
pub trait CaptureSource {
    /// Whether the source can currently produce frames.
    fn is_available(&self) -> bool;

    /// Wait for and return the next frame.
    async fn capture(&mut self) -> Result<Frame, CaptureError>;
}
