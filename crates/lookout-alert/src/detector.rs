use crate::{AlertError, Detection};
use lookout_video::Frame;
use serde::Deserialize;
use std::path::Path;

/// Finds labelled objects in a frame.
#[allow(async_fn_in_trait)]
pub trait Detector {
    /// Report the objects in `frame` whose label is one of `labels`.
    async fn detect(&mut self, frame: &Frame, labels: &[String])
    -> Result<Vec<Detection>, AlertError>;
}

#[derive(Deserialize)]
struct RawBox {
    xmin: f32,
    ymin: f32,
    xmax: f32,
    ymax: f32,
}

#[derive(Deserialize)]
struct RawDetection {
    label: String,
    score: f32,
    #[serde(rename = "box")]
    bbox: RawBox,
}

impl From<RawDetection> for Detection {
    fn from(raw: RawDetection) -> Self {
        let b = raw.bbox;
        Detection::from_corners(raw.label, raw.score, (b.xmin, b.ymin, b.xmax, b.ymax))
    }
}

/// Plays back recorded detections, one cycle per call, starting over after the
/// last one.
///
/// The JSON form is a list of cycles, each a list of
/// `{"label", "score", "box": {"xmin", "ymin", "xmax", "ymax"}}` objects.
pub struct ReplayDetector {
    cycles: Vec<Vec<Detection>>,
    next: usize,
}

impl ReplayDetector {
    pub fn from_cycles(cycles: Vec<Vec<Detection>>) -> Result<Self, AlertError> {
        if cycles.is_empty() {
            return Err(AlertError::Detect("replay has no cycles".to_string()));
        }
        Ok(Self { cycles, next: 0 })
    }

    pub fn from_json(json: &str) -> Result<Self, AlertError> {
        let raw: Vec<Vec<RawDetection>> = serde_json::from_str(json)?;
        Self::from_cycles(
            raw.into_iter()
                .map(|cycle| cycle.into_iter().map(Detection::from).collect())
                .collect(),
        )
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AlertError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }
}

impl Detector for ReplayDetector {
    async fn detect(
        &mut self,
        frame: &Frame,
        labels: &[String],
    ) -> Result<Vec<Detection>, AlertError> {
        let cycle = &self.cycles[self.next];
        self.next = (self.next + 1) % self.cycles.len();

        let detections: Vec<Detection> = cycle
            .iter()
            .filter(|d| labels.contains(&d.label))
            .cloned()
            .collect();
        log::debug!("{}: {} detections", frame, detections.len());
        Ok(detections)
    }
}
