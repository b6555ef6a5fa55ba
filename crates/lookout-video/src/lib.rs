//! Frames and capture sources for the camera side of lookout.
//!
//! A [`CaptureSource`] hands out [`Frame`]s one at a time; the frame server
//! pulls from it at its own pace.

pub mod config;
pub mod error;
pub mod frame;
pub mod pattern;
pub mod traits;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use config::{CaptureConfig, PixelFormat};
pub use error::CaptureError;
pub use frame::Frame;
pub use pattern::PatternSource;
pub use traits::CaptureSource;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Source;
