//! Scale normalization and per-segment classification.
//!
//! Every segment compares a signed pixel offset between two landmarks with a
//! pair of bounds expressed in `Unit`s. The bounds and cue labels come from a
//! lookup keyed by `Side`. Horizontal segments (neck, back) read the left side
//! as the mirror image of the right: bounds negate and swap, and so do the
//! cues. The head segment measures along the vertical axis, which facing
//! direction does not affect, so both sides share one rule.

use serde::{Deserialize, Serialize};

use super::side::Side;
use crate::keypoint::PixelPoint;

const UNIT_DIVISOR: f64 = 10.0;

/// Per-frame reference length: one tenth of the ear-to-shoulder distance.
///
/// Always strictly positive. The same positive unit is used for both sides;
/// mirroring is handled entirely by the rule table.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Unit(f64);

impl Unit {
    /// `None` when either landmark is missing or they coincide.
    pub fn from_landmarks(ear: Option<PixelPoint>, shoulder: Option<PixelPoint>) -> Option<Self> {
        let distance = ear?.distance_to(shoulder?);
        if distance > 0.0 {
            Some(Unit(distance / UNIT_DIVISOR))
        } else {
            None
        }
    }

    pub fn pixels(self) -> f64 {
        self.0
    }
}

/// Monitored body-angle relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// Nose relative to ear, vertical axis.
    Head,
    /// Ear relative to shoulder, horizontal axis.
    Neck,
    /// Shoulder relative to hip, horizontal axis.
    Back,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Head, Segment::Neck, Segment::Back];

    pub fn label(self) -> &'static str {
        match self {
            Segment::Head => "Nose-Ear",
            Segment::Neck => "Ear-Shoulder",
            Segment::Back => "Shoulder-Hip",
        }
    }

    fn is_horizontal(self) -> bool {
        !matches!(self, Segment::Head)
    }
}

/// Corrective cue shown for a deviated segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    TiltHeadDown,
    TiltHeadUp,
    BendNeckBackward,
    BendNeckForward,
    SitBackward,
    SitForward,
}

impl Cue {
    pub fn label(self) -> &'static str {
        match self {
            Cue::TiltHeadDown => "Tilt head down!",
            Cue::TiltHeadUp => "Tilt head up!",
            Cue::BendNeckBackward => "Bend neck backward!",
            Cue::BendNeckForward => "Bend neck forward!",
            Cue::SitBackward => "Sit backward!",
            Cue::SitForward => "Sit forward!",
        }
    }
}

/// Outcome for one segment in one frame. Exactly one per segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentVerdict {
    Good,
    Deviated(Cue),
    Unavailable,
}

impl SegmentVerdict {
    pub fn cue(self) -> Option<Cue> {
        match self {
            SegmentVerdict::Deviated(cue) => Some(cue),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SegmentVerdict::Good => "Good",
            SegmentVerdict::Deviated(cue) => cue.label(),
            SegmentVerdict::Unavailable => "None",
        }
    }
}

/// Bounds in units plus the cue for each side of the band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentRule {
    pub upper: f64,
    pub lower: f64,
    pub above: Cue,
    pub below: Cue,
}

impl SegmentRule {
    /// Rule for the horizontally mirrored view.
    pub fn mirrored(self) -> Self {
        SegmentRule {
            upper: -self.lower,
            lower: -self.upper,
            above: self.below,
            below: self.above,
        }
    }

    pub fn classify(&self, offset: f64, unit: Unit) -> SegmentVerdict {
        if offset > self.upper * unit.pixels() {
            SegmentVerdict::Deviated(self.above)
        } else if offset < self.lower * unit.pixels() {
            SegmentVerdict::Deviated(self.below)
        } else {
            SegmentVerdict::Good
        }
    }
}

const RIGHT_RULES: [(Segment, SegmentRule); 3] = [
    (
        Segment::Head,
        SegmentRule {
            upper: 1.0,
            lower: -2.0,
            above: Cue::TiltHeadDown,
            below: Cue::TiltHeadUp,
        },
    ),
    (
        Segment::Neck,
        SegmentRule {
            upper: 1.5,
            lower: -1.0,
            above: Cue::BendNeckBackward,
            below: Cue::BendNeckForward,
        },
    ),
    (
        Segment::Back,
        SegmentRule {
            upper: 2.0,
            lower: -3.0,
            above: Cue::SitBackward,
            below: Cue::SitForward,
        },
    ),
];

/// Rule for a segment on a side. `None` for `Side::Unknown`.
pub fn rule(segment: Segment, side: Side) -> Option<SegmentRule> {
    let right = RIGHT_RULES
        .iter()
        .find(|(s, _)| *s == segment)
        .map(|(_, rule)| *rule)?;
    match side {
        Side::Right => Some(right),
        Side::Left if segment.is_horizontal() => Some(right.mirrored()),
        Side::Left => Some(right),
        Side::Unknown => None,
    }
}

/// Landmarks feeding the segment offsets for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SegmentInputs {
    pub nose: Option<PixelPoint>,
    pub ear: Option<PixelPoint>,
    pub shoulder: Option<PixelPoint>,
    pub hip: Option<PixelPoint>,
}

/// Signed pixel offset for a segment, when both landmarks are present.
pub fn offset(segment: Segment, inputs: &SegmentInputs) -> Option<f64> {
    match segment {
        Segment::Head => Some(inputs.ear?.y as f64 - inputs.nose?.y as f64),
        Segment::Neck => Some(inputs.ear?.x as f64 - inputs.shoulder?.x as f64),
        Segment::Back => Some(inputs.shoulder?.x as f64 - inputs.hip?.x as f64),
    }
}

/// A segment's offset and verdict for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentReading {
    pub segment: Segment,
    pub offset: Option<f64>,
    pub verdict: SegmentVerdict,
}

/// Classify one segment. Unavailable without a unit, a side, or the landmarks.
pub fn classify_segment(
    segment: Segment,
    side: Side,
    unit: Option<Unit>,
    inputs: &SegmentInputs,
) -> SegmentReading {
    let offset = offset(segment, inputs);
    let verdict = match (unit, rule(segment, side), offset) {
        (Some(unit), Some(rule), Some(offset)) => rule.classify(offset, unit),
        _ => SegmentVerdict::Unavailable,
    };
    SegmentReading {
        segment,
        offset,
        verdict,
    }
}
