use crate::{CaptureSettings, SourceKind};
use lookout_video::{CaptureError, CaptureSource, Frame, PatternSource};

#[cfg(feature = "v4l2")]
use lookout_video::V4l2Source;

/// The capture source picked by configuration.
pub enum AnySource {
    Pattern(PatternSource),
    #[cfg(feature = "v4l2")]
    V4l2(V4l2Source),
}

impl AnySource {
    /// Whether this build can open `kind`.
    pub fn is_supported(kind: SourceKind) -> bool {
        match kind {
            SourceKind::Pattern => true,
            SourceKind::V4l2 => cfg!(feature = "v4l2"),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn open(settings: &CaptureSettings) -> Result<Self, CaptureError> {
        log::info!("opening {:?} capture source", settings.source);
        match settings.source {
            SourceKind::Pattern => Ok(AnySource::Pattern(PatternSource::new(&settings.config))),
            #[cfg(feature = "v4l2")]
            SourceKind::V4l2 => Ok(AnySource::V4l2(V4l2Source::new(settings.config.clone())?)),
            #[cfg(not(feature = "v4l2"))]
            SourceKind::V4l2 => Err(CaptureError::Device(
                "built without v4l2 support".to_string(),
            )),
        }
    }
}

impl CaptureSource for AnySource {
    fn is_available(&self) -> bool {
        match self {
            AnySource::Pattern(source) => source.is_available(),
            #[cfg(feature = "v4l2")]
            AnySource::V4l2(source) => source.is_available(),
        }
    }

    async fn capture(&mut self) -> Result<Frame, CaptureError> {
        match self {
            AnySource::Pattern(source) => source.capture().await,
            #[cfg(feature = "v4l2")]
            AnySource::V4l2(source) => source.capture().await,
        }
    }
}
