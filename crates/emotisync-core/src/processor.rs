//! Maps raw per-face service output into a display-ready report.

use crate::emotion::{self, EmotionDisplay};
use crate::types::FaceDetection;

/// One processed detection, indexed from 1 in service detection order.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceReading {
    pub index: usize,
    pub display: EmotionDisplay,
    pub confidence: f32,
    /// Original `[x1, y1, x2, y2]` box, untouched.
    pub bbox: [f32; 4],
}

/// Display-ready summary of a successful recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionReport {
    /// Localized labels joined by ", " in detection order.
    pub summary: String,
    pub detailed: Vec<FaceReading>,
}

/// Build a report from the service's face list.
///
/// Pure over its input: order is detection order from the service, nothing
/// is re-sorted, and repeated calls yield identical output. Callers handle
/// the `success == false` and empty-faces cases before invoking this.
pub fn process(faces: &[FaceDetection]) -> EmotionReport {
    let labels: Vec<String> = faces
        .iter()
        .map(|face| emotion::display_for(&face.expression).label)
        .collect();

    let detailed = faces
        .iter()
        .enumerate()
        .map(|(i, face)| FaceReading {
            index: i + 1,
            display: emotion::display_for(&face.expression),
            confidence: face.confidence,
            bbox: face.bbox,
        })
        .collect();

    EmotionReport {
        summary: labels.join(", "),
        detailed,
    }
}
