//! Detection values consumed from the detector and the per-frame decision
//! handed back to overlay renderers.

use serde::{Deserialize, Serialize};

use crate::category::{Category, CategorySet};

/// Axis-aligned box in capture pixels, `(x1, y1)` top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Rescale from capture resolution to display resolution.
    pub fn scaled(&self, scale_w: f32, scale_h: f32) -> Self {
        Self {
            x1: self.x1 * scale_w,
            y1: self.y1 * scale_h,
            x2: self.x2 * scale_w,
            y2: self.y2 * scale_h,
        }
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One object reported by the detector for the current frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    /// 0.0 – 1.0
    pub confidence: f32,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: impl Into<BoundingBox>) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox: bbox.into(),
        }
    }
}

/// A classified detection, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub category: Category,
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Annotation {
    /// Overlay text, e.g. `"bottle 0.87"`.
    pub fn caption(&self) -> String {
        format!("{} {:.2}", self.label, self.confidence)
    }

    pub fn scaled(&self, scale_w: f32, scale_h: f32) -> Self {
        Self {
            bbox: self.bbox.scaled(scale_w, scale_h),
            ..self.clone()
        }
    }
}

/// Outcome of one frame: what was seen, what was chosen, what was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameDecision {
    pub detected: CategorySet,
    pub chosen: Option<Category>,
    /// Detected categories that lost arbitration this frame.
    pub suppressed: CategorySet,
    /// Classified detections, in detector order.
    pub annotations: Vec<Annotation>,
}
