//! The lookout application: a camera host streaming frames, and a watcher
//! turning frames, remote or from a local camera, into alerts.

pub mod config;
pub mod source;
pub mod watch;

pub use config::{AlertSettings, CaptureSettings, LookoutConfig, SourceKind, WatchSettings};
pub use source::AnySource;
pub use watch::{AnyAlerter, WatchStats, Watcher};
