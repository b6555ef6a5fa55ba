use lookout_base::{Rect, Vec2};

/// One object the detector found in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub score: f32,
    pub bbox: Rect<f32>,
}

impl Detection {
    pub fn new(label: impl Into<String>, score: f32, bbox: Rect<f32>) -> Self {
        Self {
            label: label.into(),
            score,
            bbox,
        }
    }

    /// Build from corner coordinates (`xmin, ymin, xmax, ymax`).
    pub fn from_corners(
        label: impl Into<String>,
        score: f32,
        (xmin, ymin, xmax, ymax): (f32, f32, f32, f32),
    ) -> Self {
        Self::new(
            label,
            score,
            Rect::from_min_max(Vec2::new(xmin, ymin), Vec2::new(xmax, ymax)),
        )
    }
}
