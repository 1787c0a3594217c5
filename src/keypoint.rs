//! Keypoint identity, projection and confidence filtering.
//!
//! The upstream pose model reports keypoints in relative coordinates where
//! `(0, 0)` is the image top-left and `(1, 1)` the bottom-right. This module
//! maps them into integer pixel space and keeps only the landmarks the
//! posture classifier needs, keyed by an explicit `BodyPart` rather than a
//! positional index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Keypoints scoring below this are treated as absent.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.5;

/// Body part identity for a keypoint.
///
/// Indices follow the 17-point COCO ordering used by PoseNet/MoveNet.
/// Parts the classifier does not use collapse into `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    Nose,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    Other,
}

impl BodyPart {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Nose,
            3 => Self::LeftEar,
            4 => Self::RightEar,
            5 => Self::LeftShoulder,
            6 => Self::RightShoulder,
            11 => Self::LeftHip,
            12 => Self::RightHip,
            _ => Self::Other,
        }
    }

    /// True for the landmarks that contribute to a side's confidence sum.
    pub fn is_side_landmark(self) -> bool {
        !matches!(self, Self::Nose | Self::Other)
    }
}

/// Integer pixel position, origin at the image top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: PixelPoint) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Image dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Pixel-space bounding box corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Map a relative `(x, y)` keypoint to pixel coordinates (multiply, then truncate).
pub fn project_point(x: f32, y: f32, size: ImageSize) -> PixelPoint {
    PixelPoint {
        x: (x as f64 * size.width as f64) as i32,
        y: (y as f64 * size.height as f64) as i32,
    }
}

/// Map a relative `[x1, y1, x2, y2]` bounding box to pixel coordinates.
pub fn project_box(bbox: [f32; 4], size: ImageSize) -> PixelBox {
    let top_left = project_point(bbox[0], bbox[1], size);
    let bottom_right = project_point(bbox[2], bbox[3], size);
    PixelBox {
        x1: top_left.x,
        y1: top_left.y,
        x2: bottom_right.x,
        y2: bottom_right.y,
    }
}

/// A keypoint that survived filtering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    pub part: BodyPart,
    pub position: PixelPoint,
    pub score: f32,
}

/// Landmarks present in one frame, keyed by body part.
///
/// Parts scoring below the threshold are absent, never zero-filled.
/// `others` keeps surviving keypoints that are not posture landmarks so the
/// annotator can still label them.
#[derive(Clone, Debug, Default)]
pub struct KeypointSet {
    landmarks: BTreeMap<BodyPart, Keypoint>,
    others: Vec<Keypoint>,
}

impl KeypointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter raw `(index, relative position, score)` tuples into a set.
    ///
    /// When a model reports the same part twice the later tuple wins, which
    /// matches iterating the model output in order.
    pub fn from_raw<I>(raw: I, size: ImageSize, threshold: f32) -> Self
    where
        I: IntoIterator<Item = (usize, [f32; 2], f32)>,
    {
        let mut set = Self::new();
        for (index, [x, y], score) in raw {
            if score < threshold {
                continue;
            }
            set.insert(Keypoint {
                part: BodyPart::from_index(index),
                position: project_point(x, y, size),
                score,
            });
        }
        set
    }

    /// Insert an already-projected keypoint without threshold checks.
    pub fn insert(&mut self, keypoint: Keypoint) {
        if keypoint.part == BodyPart::Other {
            self.others.push(keypoint);
        } else {
            self.landmarks.insert(keypoint.part, keypoint);
        }
    }

    /// Builder-style insert used heavily by tests and callers that already
    /// work in pixel space.
    pub fn with(mut self, part: BodyPart, x: i32, y: i32, score: f32) -> Self {
        self.insert(Keypoint {
            part,
            position: PixelPoint::new(x, y),
            score,
        });
        self
    }

    pub fn get(&self, part: BodyPart) -> Option<&Keypoint> {
        self.landmarks.get(&part)
    }

    pub fn position(&self, part: BodyPart) -> Option<PixelPoint> {
        self.get(part).map(|kp| kp.position)
    }

    pub fn contains(&self, part: BodyPart) -> bool {
        self.landmarks.contains_key(&part)
    }

    /// All surviving keypoints: landmarks in `BodyPart` order, then the
    /// rest in model order.
    pub fn iter(&self) -> impl Iterator<Item = &Keypoint> {
        self.landmarks.values().chain(self.others.iter())
    }

    pub fn len(&self) -> usize {
        self.landmarks.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_part_from_model_index() {
        assert_eq!(BodyPart::from_index(0), BodyPart::Nose);
        assert_eq!(BodyPart::from_index(3), BodyPart::LeftEar);
        assert_eq!(BodyPart::from_index(4), BodyPart::RightEar);
        assert_eq!(BodyPart::from_index(6), BodyPart::RightShoulder);
        assert_eq!(BodyPart::from_index(12), BodyPart::RightHip);
        assert_eq!(BodyPart::from_index(1), BodyPart::Other);
        assert_eq!(BodyPart::from_index(99), BodyPart::Other);
    }

    #[test]
    fn projection_truncates() {
        let size = ImageSize::new(640, 480);
        assert_eq!(project_point(0.5, 0.25, size), PixelPoint::new(320, 120));
        assert_eq!(project_point(0.999, 0.999, size), PixelPoint::new(639, 479));

        let bbox = project_box([0.25, 0.5, 0.75, 1.0], size);
        assert_eq!(bbox, PixelBox { x1: 160, y1: 240, x2: 480, y2: 480 });
    }

    #[test]
    fn filter_drops_low_scores_instead_of_zero_filling() {
        let size = ImageSize::new(100, 100);
        let raw = vec![
            (0, [0.5, 0.5], 0.9),
            (4, [0.4, 0.4], 0.49),
            (6, [0.3, 0.6], 0.5),
            (9, [0.1, 0.9], 0.8),
        ];
        let set = KeypointSet::from_raw(raw, size, DEFAULT_SCORE_THRESHOLD);

        assert!(set.contains(BodyPart::Nose));
        assert!(!set.contains(BodyPart::RightEar));
        assert_eq!(set.position(BodyPart::RightShoulder), Some(PixelPoint::new(30, 60)));
        assert_eq!(set.len(), 3);
        assert!(!set.contains(BodyPart::Other));
    }

    #[test]
    fn distance_is_euclidean() {
        let a = PixelPoint::new(0, 0);
        let b = PixelPoint::new(3, 4);
        assert_eq!(a.distance_to(b), 5.0);
    }

    #[test]
    fn distance_between_saturated_points_is_finite() {
        let size = ImageSize::new(640, 480);
        let far_right = project_point(1e9, 0.0, size);
        let far_left = project_point(-1e9, 0.0, size);
        assert_eq!(far_right.x, i32::MAX);
        assert_eq!(far_left.x, i32::MIN);

        let d = far_right.distance_to(far_left);
        assert!(d.is_finite());
        assert_eq!(d, i32::MAX as f64 - i32::MIN as f64);
    }

    #[test]
    fn iteration_order_is_fixed() {
        let set = KeypointSet::new()
            .with(BodyPart::RightHip, 1, 1, 0.9)
            .with(BodyPart::Other, 9, 9, 0.9)
            .with(BodyPart::Nose, 2, 2, 0.9)
            .with(BodyPart::LeftShoulder, 3, 3, 0.9);
        let parts: Vec<BodyPart> = set.iter().map(|kp| kp.part).collect();
        assert_eq!(
            parts,
            vec![
                BodyPart::Nose,
                BodyPart::LeftShoulder,
                BodyPart::RightHip,
                BodyPart::Other
            ]
        );
    }
}
