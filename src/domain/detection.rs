use serde::{Deserialize, Serialize};
use std::fmt;

/// Output of the detection model before it is mapped into the domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub class: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    /// Always within `0.0..=1.0`.
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Confidence as a whole percentage, rounded half away from zero.
    pub fn percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

impl From<RawDetection> for Detection {
    fn from(raw: RawDetection) -> Self {
        Self::new(raw.class, raw.score)
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}%", self.label, self.percent())
    }
}

/// Detections for the currently displayed image, in model order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult(Vec<Detection>);

impl DetectionResult {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self(detections)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.0.iter()
    }

    /// One display line per detection.
    pub fn lines(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<RawDetection> for DetectionResult {
    fn from_iter<I: IntoIterator<Item = RawDetection>>(iter: I) -> Self {
        Self(iter.into_iter().map(Detection::from).collect())
    }
}
