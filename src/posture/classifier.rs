use serde::{Deserialize, Serialize};

use super::counters::PostureMetrics;
use super::segment::{classify_segment, Segment, SegmentInputs, SegmentReading, Unit};
use super::side::{select_side, Side};
use crate::annotate::{FrameAnnotator, TextSink};
use crate::frame::FrameObservation;
use crate::keypoint::{BodyPart, KeypointSet, PixelPoint, DEFAULT_SCORE_THRESHOLD};

/// Torso width must stay below `height / ratio` for a side-on view.
pub const DEFAULT_TORSO_RATIO: f64 = 4.0;

/// Reasons a frame is not valid for measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameIssue {
    CameraAngle,
    MissingNose,
    MissingEar,
    MissingShoulder,
    MissingHip,
    /// Ear and shoulder coincide, so no unit can be derived.
    DegenerateScale,
}

impl FrameIssue {
    pub fn message(self) -> &'static str {
        match self {
            FrameIssue::CameraAngle => "Camera angle incorrect!",
            FrameIssue::MissingNose => "Nose not found!",
            FrameIssue::MissingEar => "Ear not found!",
            FrameIssue::MissingShoulder => "Shoulder not found!",
            FrameIssue::MissingHip => "Hip not found!",
            FrameIssue::DegenerateScale => "Ear and shoulder overlap!",
        }
    }
}

/// Everything the classifier decided about one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameAssessment {
    pub side: Side,
    #[serde(skip)]
    pub unit: Option<Unit>,
    pub head: SegmentReading,
    pub neck: SegmentReading,
    pub back: SegmentReading,
    pub issues: Vec<FrameIssue>,
}

impl FrameAssessment {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn readings(&self) -> [&SegmentReading; 3] {
        [&self.head, &self.neck, &self.back]
    }

    pub fn reading(&self, segment: Segment) -> &SegmentReading {
        match segment {
            Segment::Head => &self.head,
            Segment::Neck => &self.neck,
            Segment::Back => &self.back,
        }
    }

    pub fn has_issue(&self, issue: FrameIssue) -> bool {
        self.issues.contains(&issue)
    }
}

/// Stateless per-frame posture classifier.
#[derive(Clone, Copy, Debug)]
pub struct PostureClassifier {
    torso_ratio: f64,
}

impl Default for PostureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PostureClassifier {
    pub fn new() -> Self {
        Self {
            torso_ratio: DEFAULT_TORSO_RATIO,
        }
    }

    pub fn with_torso_ratio(mut self, ratio: f64) -> Self {
        self.torso_ratio = ratio;
        self
    }

    /// Classify one frame's landmarks. Total over every landmark subset.
    pub fn assess(&self, keypoints: &KeypointSet) -> FrameAssessment {
        let selection = select_side(keypoints);
        let nose = keypoints.position(BodyPart::Nose);

        let mut issues = Vec::new();
        if self.camera_angle_incorrect(keypoints, selection.side, selection.hip) {
            issues.push(FrameIssue::CameraAngle);
        }
        for (present, issue) in [
            (nose.is_some(), FrameIssue::MissingNose),
            (selection.ear.is_some(), FrameIssue::MissingEar),
            (selection.shoulder.is_some(), FrameIssue::MissingShoulder),
            (selection.hip.is_some(), FrameIssue::MissingHip),
        ] {
            if !present {
                issues.push(issue);
            }
        }

        let unit = Unit::from_landmarks(selection.ear, selection.shoulder);
        if unit.is_none() && selection.ear.is_some() && selection.shoulder.is_some() {
            issues.push(FrameIssue::DegenerateScale);
        }

        let inputs = SegmentInputs {
            nose,
            ear: selection.ear,
            shoulder: selection.shoulder,
            hip: selection.hip,
        };
        let assessment = FrameAssessment {
            side: selection.side,
            unit,
            head: classify_segment(Segment::Head, selection.side, unit, &inputs),
            neck: classify_segment(Segment::Neck, selection.side, unit, &inputs),
            back: classify_segment(Segment::Back, selection.side, unit, &inputs),
            issues,
        };

        log::debug!(
            "side={} unit={:?} head={:?} neck={:?} back={:?} issues={:?}",
            assessment.side.label(),
            assessment.unit.map(Unit::pixels),
            assessment.head.verdict,
            assessment.neck.verdict,
            assessment.back.verdict,
            assessment.issues
        );
        assessment
    }

    /// Too front-facing when shoulder width reaches `height / ratio`.
    /// Needs both shoulders and the watched hip; otherwise not judged.
    fn camera_angle_incorrect(
        &self,
        keypoints: &KeypointSet,
        side: Side,
        hip: Option<PixelPoint>,
    ) -> bool {
        let (Some(left), Some(right), Some(hip)) = (
            keypoints.position(BodyPart::LeftShoulder),
            keypoints.position(BodyPart::RightShoulder),
            hip,
        ) else {
            return false;
        };
        let watched = match side {
            Side::Left => left,
            _ => right,
        };
        let width = left.distance_to(right);
        let height = watched.distance_to(hip);
        width >= height / self.torso_ratio
    }
}

/// One classifier plus its session counters, bound to a single stream.
///
/// Every call takes `&mut self`, so frames on one stream are classified
/// strictly one after another. Use one monitor per camera or subject.
#[derive(Clone, Debug)]
pub struct PostureMonitor {
    classifier: PostureClassifier,
    score_threshold: f32,
    metrics: PostureMetrics,
}

impl Default for PostureMonitor {
    fn default() -> Self {
        Self::new(PostureClassifier::new())
    }
}

impl PostureMonitor {
    pub fn new(classifier: PostureClassifier) -> Self {
        Self {
            classifier,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            metrics: PostureMetrics::new(),
        }
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn classifier(&self) -> &PostureClassifier {
        &self.classifier
    }

    /// Counter snapshot after the most recent frame.
    pub fn metrics(&self) -> PostureMetrics {
        self.metrics
    }

    /// Classify already-filtered landmarks and update the counters.
    pub fn observe_keypoints(&mut self, keypoints: &KeypointSet) -> (FrameAssessment, PostureMetrics) {
        let assessment = self.classifier.assess(keypoints);
        self.metrics.record(&assessment);
        (assessment, self.metrics)
    }

    /// Classify a pipeline frame and return the counter snapshot.
    pub fn observe(&mut self, frame: &FrameObservation) -> PostureMetrics {
        let keypoints = frame.keypoints(self.score_threshold);
        self.observe_keypoints(&keypoints).1
    }

    /// Like `observe`, also rendering diagnostics into `sink`.
    pub fn observe_annotated(
        &mut self,
        frame: &FrameObservation,
        sink: &mut dyn TextSink,
    ) -> PostureMetrics {
        let keypoints = frame.keypoints(self.score_threshold);
        let (assessment, metrics) = self.observe_keypoints(&keypoints);
        let annotator = FrameAnnotator::new(frame, &keypoints, &assessment, &metrics);
        annotator.render(sink);
        metrics
    }

    /// Start a new session on the same stream.
    pub fn reset(&mut self) {
        self.metrics.reset();
    }
}
