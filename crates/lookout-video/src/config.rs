use serde::Deserialize;

/// Pixel layout requested from the capture device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Packed 8-bit RGB.
    #[default]
    Rgb,
    /// Packed YUV 4:2:2, two bytes per pixel.
    Yuyv,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn channels(&self) -> u8 {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Yuyv => 2,
        }
    }

    /// V4L2 four character code.
    pub fn fourcc(&self) -> [u8; 4] {
        match self {
            PixelFormat::Rgb => *b"RGB3",
            PixelFormat::Yuyv => *b"YUYV",
        }
    }
}

/// Configuration for a capture source.
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    device: String,
    width: u32,
    height: u32,
    fps: u32,
    format: PixelFormat,
    buffer_count: u32,
    frame_limit: Option<u64>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            fps: 10,
            format: PixelFormat::Rgb,
            buffer_count: 4,
            frame_limit: None,
        }
    }
}

impl CaptureConfig {
    /// Set the device path (e.g., "/dev/video0").
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Set the frames per second. Zero means "as fast as the consumer reads".
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the buffer count for the capture stream.
    pub fn with_buffer_count(mut self, buffer_count: u32) -> Self {
        self.buffer_count = buffer_count;
        self
    }

    /// Stop after this many frames. Only synthetic sources honor it.
    pub fn with_frame_limit(mut self, frame_limit: Option<u64>) -> Self {
        self.frame_limit = frame_limit;
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn buffer_count(&self) -> u32 {
        self.buffer_count
    }

    pub fn frame_limit(&self) -> Option<u64> {
        self.frame_limit
    }
}
