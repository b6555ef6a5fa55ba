use crate::{CaptureConfig, CaptureError, CaptureSource, Frame};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

type FrameResult = Result<Frame, CaptureError>;

/// Raw (uncompressed) capture from a V4L2 device.
///
/// Frames are read on a dedicated thread and handed over through a channel
/// no deeper than the configured buffer count.
pub struct V4l2Source {
    config: CaptureConfig,
    device: Option<Device>,
    width: u32,
    height: u32,
    receiver: Option<mpsc::Receiver<FrameResult>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for V4l2Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Source")
            .field("config", &self.config)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("receiver", &self.receiver.is_some())
            .field("thread_handle", &self.thread_handle.is_some())
            .finish()
    }
}

impl V4l2Source {
    /// Open `config.device()` and negotiate the requested raw format.
    ///
    /// The driver may adjust the resolution; the negotiated one is what frames
    /// will carry. A driver that substitutes another pixel format is rejected.
    pub fn new(config: CaptureConfig) -> Result<Self, CaptureError> {
        let device = Device::with_path(config.device())?;

        let fourcc = FourCC::new(&config.format().fourcc());
        let requested = Format::new(config.width(), config.height(), fourcc);
        let format = Capture::set_format(&device, &requested)?;
        if format.fourcc != fourcc {
            return Err(CaptureError::Device(format!(
                "{} does not support {:?}",
                config.device(),
                config.format()
            )));
        }

        if config.fps() > 0 {
            let params = v4l::video::capture::Parameters::with_fps(config.fps());
            Capture::set_params(&device, &params)?;
        }

        log::info!(
            "opened {} at {}x{} {:?}",
            config.device(),
            format.width,
            format.height,
            config.format()
        );

        Ok(Self {
            width: format.width,
            height: format.height,
            config,
            device: Some(device),
            receiver: None,
            thread_handle: None,
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    fn ensure_started(&mut self) -> Result<(), CaptureError> {
        if self.receiver.is_some() {
            return Ok(());
        }

        let device = self
            .device
            .take()
            .ok_or_else(|| CaptureError::Device("device already consumed".to_string()))?;

        let buffer_count = self.config.buffer_count().max(1);
        let (tx, rx) = mpsc::channel(buffer_count as usize);
        let (width, height, channels) = (self.width, self.height, self.config.format().channels());

        let handle = thread::spawn(move || {
            if let Err(e) = Self::capture_loop(device, &tx, buffer_count, width, height, channels) {
                log::error!("v4l2 capture thread stopped: {}", e);
                let _ = tx.blocking_send(Err(e));
            }
        });

        self.receiver = Some(rx);
        self.thread_handle = Some(handle);
        Ok(())
    }

    fn capture_loop(
        device: Device,
        tx: &mpsc::Sender<FrameResult>,
        buffer_count: u32,
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<(), CaptureError> {
        let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, buffer_count)?;
        let frame_len = width as usize * height as usize * channels as usize;

        loop {
            let (buffer, _metadata) = CaptureStream::next(&mut stream)
                .map_err(|e| CaptureError::Stream(e.to_string()))?;

            // drivers may pad the mapped buffer past the image
            if buffer.len() < frame_len {
                return Err(CaptureError::Shape(format!(
                    "driver returned {} bytes, expected {}",
                    buffer.len(),
                    frame_len
                )));
            }
            let frame = Frame::new(width, height, channels, buffer[..frame_len].to_vec())?;

            if tx.blocking_send(Ok(frame)).is_err() {
                // receiver dropped
                return Ok(());
            }
        }
    }
}

impl CaptureSource for V4l2Source {
    fn is_available(&self) -> bool {
        match &self.receiver {
            Some(receiver) => !receiver.is_closed(),
            None => self.device.is_some(),
        }
    }

    async fn capture(&mut self) -> Result<Frame, CaptureError> {
        self.ensure_started()?;

        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CaptureError::Stream("receiver not initialized".to_string()))?;

        receiver
            .recv()
            .await
            .ok_or_else(|| CaptureError::Stream("capture thread stopped".to_string()))?
    }
}

impl Drop for V4l2Source {
    fn drop(&mut self) {
        // closing the channel stops the capture thread at its next frame
        drop(self.receiver.take());
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}
