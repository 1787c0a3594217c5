//! Per-frame observation handed over by the pose-estimation pipeline.
//!
//! - `FrameObservation`: image size, optional capture time and every subject
//!   the detector reported.
//! - `SubjectObservation`: one subject's bounding box and raw keypoint triples.
//!
//! The classifier assumes single-person framing. Only the first subject is
//! evaluated; any further detections are ignored.

use serde::{Deserialize, Serialize};

use crate::keypoint::{project_box, ImageSize, KeypointSet, PixelBox};

/// Raw keypoint as emitted by the model: `[x, y, score]` in relative units.
pub type RawKeypoint = [f32; 3];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SubjectObservation {
    /// Relative `[x1, y1, x2, y2]` bounding box.
    #[serde(default)]
    pub bbox: Option<[f32; 4]>,
    #[serde(default)]
    pub bbox_score: Option<f32>,
    /// Keypoints in model index order.
    #[serde(default)]
    pub keypoints: Vec<RawKeypoint>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameObservation {
    pub image_size: ImageSize,
    /// Wall-clock capture time as `HH:MM:SS`, when the pipeline provides one.
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub subjects: Vec<SubjectObservation>,
}

impl FrameObservation {
    pub fn empty(image_size: ImageSize) -> Self {
        Self {
            image_size,
            timestamp: None,
            subjects: Vec::new(),
        }
    }

    /// The evaluated subject. Detections beyond the first are ignored.
    pub fn subject(&self) -> Option<&SubjectObservation> {
        self.subjects.first()
    }

    /// Pixel-space bounding box and its score, when both were reported.
    pub fn bounding_box(&self) -> Option<(PixelBox, f32)> {
        let subject = self.subject()?;
        let bbox = subject.bbox?;
        let score = subject.bbox_score?;
        Some((project_box(bbox, self.image_size), score))
    }

    /// Project and filter the subject's keypoints.
    pub fn keypoints(&self, threshold: f32) -> KeypointSet {
        match self.subject() {
            Some(subject) => KeypointSet::from_raw(
                subject
                    .keypoints
                    .iter()
                    .enumerate()
                    .map(|(index, [x, y, score])| (index, [*x, *y], *score)),
                self.image_size,
                threshold,
            ),
            None => KeypointSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::{BodyPart, PixelPoint, DEFAULT_SCORE_THRESHOLD};

    #[test]
    fn only_first_subject_is_used() {
        let json = r#"{
            "image_size": {"width": 200, "height": 100},
            "subjects": [
                {"bbox": [0.1, 0.1, 0.5, 0.75], "bbox_score": 0.8,
                 "keypoints": [[0.5, 0.5, 0.9]]},
                {"keypoints": [[0.9, 0.9, 0.9]]}
            ]
        }"#;
        let frame: FrameObservation = serde_json::from_str(json).unwrap();
        let set = frame.keypoints(DEFAULT_SCORE_THRESHOLD);

        assert_eq!(set.len(), 1);
        assert_eq!(set.position(BodyPart::Nose), Some(PixelPoint::new(100, 50)));

        let (bbox, score) = frame.bounding_box().unwrap();
        assert_eq!((bbox.x1, bbox.y2), (20, 75));
        assert_eq!(score, 0.8);
    }

    #[test]
    fn no_subject_yields_empty_set() {
        let frame = FrameObservation::empty(ImageSize::new(640, 480));
        assert!(frame.subject().is_none());
        assert!(frame.bounding_box().is_none());
        assert!(frame.keypoints(DEFAULT_SCORE_THRESHOLD).is_empty());
    }

    #[test]
    fn bbox_without_score_is_not_reported() {
        let frame = FrameObservation {
            image_size: ImageSize::new(100, 100),
            timestamp: None,
            subjects: vec![SubjectObservation {
                bbox: Some([0.0, 0.0, 1.0, 1.0]),
                bbox_score: None,
                keypoints: vec![],
            }],
        };
        assert!(frame.bounding_box().is_none());
    }
}
