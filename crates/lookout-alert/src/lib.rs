//! Turning per-frame detections into alerts.
//!
//! A [`Detector`] reports what it sees in each frame, the [`AlertDebouncer`]
//! decides which of those sightings deserve an alert, and an [`Alerter`]
//! delivers them.

pub mod alerter;
pub mod debounce;
pub mod detection;
pub mod detector;
pub mod error;

pub use alerter::{Alert, Alerter, CommandAlerter, LogAlerter};
pub use debounce::{AlertConfig, AlertDebouncer, AlertDecision, LabelAlertState};
pub use detection::Detection;
pub use detector::{Detector, ReplayDetector};
pub use error::AlertError;
