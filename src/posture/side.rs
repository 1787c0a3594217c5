use serde::{Deserialize, Serialize};

use crate::keypoint::{BodyPart, KeypointSet, PixelPoint};

/// Body half used as the measurement basis for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Right,
    Left,
    #[default]
    Unknown,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Right => "right",
            Side::Left => "left",
            Side::Unknown => "NA",
        }
    }

    fn parts(self) -> Option<[BodyPart; 3]> {
        match self {
            Side::Right => Some([BodyPart::RightEar, BodyPart::RightShoulder, BodyPart::RightHip]),
            Side::Left => Some([BodyPart::LeftEar, BodyPart::LeftShoulder, BodyPart::LeftHip]),
            Side::Unknown => None,
        }
    }
}

/// Landmark availability for one body half.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SideEvidence {
    pub present: u8,
    pub score_sum: f32,
}

impl SideEvidence {
    fn collect(keypoints: &KeypointSet, side: Side) -> Self {
        let mut evidence = SideEvidence::default();
        for part in side.parts().into_iter().flatten() {
            if let Some(kp) = keypoints.get(part) {
                evidence.present += 1;
                evidence.score_sum += kp.score;
            }
        }
        evidence
    }
}

/// The selected side and the landmarks belonging to it.
///
/// Ear, shoulder and hip always come from the same side; the nose is
/// side-independent and lives on `Landmarks` instead.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SideSelection {
    pub side: Side,
    pub ear: Option<PixelPoint>,
    pub shoulder: Option<PixelPoint>,
    pub hip: Option<PixelPoint>,
}

/// Pick the side with more landmarks present, then the higher summed
/// confidence, then Right. `Unknown` when neither side has any landmark.
pub fn select_side(keypoints: &KeypointSet) -> SideSelection {
    let right = SideEvidence::collect(keypoints, Side::Right);
    let left = SideEvidence::collect(keypoints, Side::Left);

    let side = if right.present == 0 && left.present == 0 {
        Side::Unknown
    } else if right.present != left.present {
        if right.present > left.present {
            Side::Right
        } else {
            Side::Left
        }
    } else if right.score_sum >= left.score_sum {
        Side::Right
    } else {
        Side::Left
    };

    match side.parts() {
        Some([ear, shoulder, hip]) => SideSelection {
            side,
            ear: keypoints.position(ear),
            shoulder: keypoints.position(shoulder),
            hip: keypoints.position(hip),
        },
        None => SideSelection::default(),
    }
}
