use crate::{CaptureConfig, CaptureError, CaptureSource, Frame};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Synthetic source producing a diagonal gradient that shifts by one step per
/// frame. Useful on hosts without a camera and in tests.
pub struct PatternSource {
    width: u32,
    height: u32,
    channels: u8,
    frame_limit: Option<u64>,
    frames_captured: u64,
    pacing: Option<Interval>,
}

impl std::fmt::Debug for PatternSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternSource")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("frame_limit", &self.frame_limit)
            .field("frames_captured", &self.frames_captured)
            .finish()
    }
}

impl PatternSource {
    /// Must be called from within a tokio runtime when `config.fps()` is
    /// non-zero.
    pub fn new(config: &CaptureConfig) -> Self {
        let pacing = (config.fps() > 0).then(|| {
            let mut pacing = interval(Duration::from_secs_f64(1.0 / config.fps() as f64));
            pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
            pacing
        });
        Self {
            width: config.width(),
            height: config.height(),
            channels: config.format().channels(),
            frame_limit: config.frame_limit(),
            frames_captured: 0,
            pacing,
        }
    }

    pub fn frames_captured(&self) -> u64 {
        self.frames_captured
    }

    /// The frame this source yields at position `index`.
    pub fn render(&self, index: u64) -> Frame {
        let c = self.channels as usize;
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * c);
        for y in 0..self.height as u64 {
            for x in 0..self.width as u64 {
                let base = x.wrapping_add(y).wrapping_add(index);
                for channel in 0..c as u64 {
                    data.push(base.wrapping_add(channel * 85) as u8);
                }
            }
        }
        // shape is correct by construction
        Frame::new(self.width, self.height, self.channels, data)
            .unwrap_or_else(|e| unreachable!("pattern frame shape: {e}"))
    }
}

impl CaptureSource for PatternSource {
    fn is_available(&self) -> bool {
        self.frame_limit
            .is_none_or(|limit| self.frames_captured < limit)
    }

    async fn capture(&mut self) -> Result<Frame, CaptureError> {
        if !self.is_available() {
            return Err(CaptureError::Exhausted);
        }
        if let Some(pacing) = self.pacing.as_mut() {
            pacing.tick().await;
        }
        let frame = self.render(self.frames_captured);
        self.frames_captured += 1;
        Ok(frame)
    }
}
