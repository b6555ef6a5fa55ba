use crate::{ComError, FrameClient};
use lookout_video::{CaptureSource, Frame};

/// Where a consumer pulls frames from: a remote camera through a
/// [`FrameClient`], or a local [`CaptureSource`] directly.
#[allow(async_fn_in_trait)]
pub trait FrameFeed {
    /// Wait for the next frame. Any error means the feed is done.
    async fn next_frame(&mut self) -> Result<Frame, ComError>;
}

impl FrameFeed for FrameClient {
    async fn next_frame(&mut self) -> Result<Frame, ComError> {
        FrameClient::next_frame(self).await
    }
}

impl<S: CaptureSource> FrameFeed for S {
    async fn next_frame(&mut self) -> Result<Frame, ComError> {
        Ok(self.capture().await?)
    }
}
