//! Overlay text for a classified frame.
//!
//! The annotator only formats strings and positions. Drawing is delegated to
//! a `TextSink`, which the host pipeline implements on top of its own
//! rendering primitive. No classification happens here.

use crate::frame::FrameObservation;
use crate::keypoint::{BodyPart, KeypointSet};
use crate::posture::{FrameAssessment, FrameIssue, PostureMetrics, Unit};

const GRID_COL_PX: i32 = 10;
const GRID_ROW_PX: i32 = 18;
const BBOX_LABEL_OFFSET_PX: i32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    White,
    Yellow,
    Red,
    Black,
}

impl Color {
    /// BGR triple, the channel order most capture pipelines draw in.
    pub fn bgr(self) -> (u8, u8, u8) {
        match self {
            Color::White => (255, 255, 255),
            Color::Yellow => (0, 255, 255),
            Color::Red => (0, 0, 255),
            Color::Black => (0, 0, 0),
        }
    }
}

/// One piece of text placed at a pixel origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub color: Color,
}

/// Rendering sink supplied by the host. Pure side effect.
pub trait TextSink {
    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color);
}

impl TextSink for Vec<Annotation> {
    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color) {
        self.push(Annotation {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }
}

/// Sink that writes overlay text to the debug log for headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl TextSink for LogSink {
    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color) {
        log::debug!("overlay ({}, {}) {:?}: {}", x, y, color, text);
    }
}

fn grid(col: i32, row: i32) -> (i32, i32) {
    (GRID_COL_PX * col, GRID_ROW_PX * row)
}

fn issue_row(issue: FrameIssue) -> i32 {
    match issue {
        FrameIssue::CameraAngle => 12,
        FrameIssue::MissingNose => 13,
        FrameIssue::MissingEar => 14,
        FrameIssue::MissingShoulder => 15,
        FrameIssue::MissingHip => 16,
        FrameIssue::DegenerateScale => 17,
    }
}

/// Formats diagnostics for one frame.
pub struct FrameAnnotator<'a> {
    frame: &'a FrameObservation,
    keypoints: &'a KeypointSet,
    assessment: &'a FrameAssessment,
    metrics: &'a PostureMetrics,
}

impl<'a> FrameAnnotator<'a> {
    pub fn new(
        frame: &'a FrameObservation,
        keypoints: &'a KeypointSet,
        assessment: &'a FrameAssessment,
        metrics: &'a PostureMetrics,
    ) -> Self {
        Self {
            frame,
            keypoints,
            assessment,
            metrics,
        }
    }

    /// All overlay text for the frame, in draw order.
    pub fn annotations(&self) -> Vec<Annotation> {
        let mut out = Vec::new();
        self.render(&mut out);
        out
    }

    pub fn render(&self, sink: &mut dyn TextSink) {
        if let Some((bbox, score)) = self.frame.bounding_box() {
            sink.draw_text(
                bbox.x1,
                bbox.y2.saturating_sub(BBOX_LABEL_OFFSET_PX),
                &format!("BBox {:.2}", score),
                Color::White,
            );
        }

        for kp in self.keypoints.iter() {
            let color = match kp.part {
                BodyPart::Other => Color::White,
                _ => Color::Yellow,
            };
            sink.draw_text(
                kp.position.x,
                kp.position.y,
                &format!("({}, {})", kp.position.x, kp.position.y),
                color,
            );
        }

        for issue in &self.assessment.issues {
            let (x, y) = grid(1, issue_row(*issue));
            sink.draw_text(x, y, issue.message(), Color::Red);
        }

        let m = self.metrics;
        let unit = self
            .assessment
            .unit
            .map(Unit::pixels)
            .map_or_else(|| "NA".to_string(), |u| format!("{:.3}", u));
        let a = self.assessment;
        let rows: [(i32, i32, String, Color); 9] = [
            (1, 1, format!("Tick: {} Tock: {}", m.tick, m.tock), Color::Black),
            (20, 1, unit, Color::Yellow),
            (1, 3, format!("Nose-Ear {}", a.head.verdict.label()), Color::Black),
            (
                1,
                4,
                format!("Too High: {} Too Low: {}", m.head_high, m.head_low),
                Color::Black,
            ),
            (1, 6, format!("Ear-Shoulder {}", a.neck.verdict.label()), Color::Black),
            (
                1,
                7,
                format!(
                    "Too Forward: {} Too Backward: {}",
                    m.neck_forward, m.neck_backward
                ),
                Color::Black,
            ),
            (1, 9, format!("Shoulder-Hip {}", a.back.verdict.label()), Color::Black),
            (
                1,
                10,
                format!(
                    "Too Forward: {} Too Backward: {}",
                    m.back_forward, m.back_backward
                ),
                Color::Black,
            ),
            (1, 11, format!("Monitoring side: {}", a.side.label()), Color::Black),
        ];
        for (col, row, text, color) in rows {
            let (x, y) = grid(col, row);
            sink.draw_text(x, y, &text, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SubjectObservation;
    use crate::keypoint::ImageSize;
    use crate::posture::PostureClassifier;

    fn find<'a>(annotations: &'a [Annotation], prefix: &str) -> Option<&'a Annotation> {
        annotations.iter().find(|a| a.text.starts_with(prefix))
    }

    #[test]
    fn empty_frame_reports_missing_landmarks() {
        let frame = FrameObservation::empty(ImageSize::new(640, 480));
        let keypoints = frame.keypoints(0.5);
        let assessment = PostureClassifier::new().assess(&keypoints);
        let mut metrics = PostureMetrics::new();
        metrics.record(&assessment);

        let out = FrameAnnotator::new(&frame, &keypoints, &assessment, &metrics).annotations();

        let nose = find(&out, "Nose not found!").unwrap();
        assert_eq!((nose.x, nose.y), (10, 234));
        assert_eq!(nose.color, Color::Red);
        assert!(find(&out, "Hip not found!").is_some());
        assert_eq!(find(&out, "Tick:").unwrap().text, "Tick: 1 Tock: 0");
        assert_eq!(find(&out, "Nose-Ear").unwrap().text, "Nose-Ear None");
        assert_eq!(find(&out, "Monitoring side").unwrap().text, "Monitoring side: NA");
        assert!(out.iter().any(|a| a.text == "NA" && (a.x, a.y) == (200, 18)));
    }

    #[test]
    fn bbox_and_keypoint_labels() {
        let frame = FrameObservation {
            image_size: ImageSize::new(200, 100),
            timestamp: None,
            subjects: vec![SubjectObservation {
                bbox: Some([0.1, 0.25, 0.5, 0.75]),
                bbox_score: Some(0.876),
                keypoints: vec![[0.5, 0.5, 0.9], [0.25, 0.5, 0.9]],
            }],
        };
        let keypoints = frame.keypoints(0.5);
        let assessment = PostureClassifier::new().assess(&keypoints);
        let metrics = PostureMetrics::new();

        let out = FrameAnnotator::new(&frame, &keypoints, &assessment, &metrics).annotations();

        let bbox = find(&out, "BBox").unwrap();
        assert_eq!(bbox.text, "BBox 0.88");
        assert_eq!((bbox.x, bbox.y), (20, 45));

        let nose = out.iter().find(|a| a.text == "(100, 50)").unwrap();
        assert_eq!(nose.color, Color::Yellow);
        let other = out.iter().find(|a| a.text == "(50, 50)").unwrap();
        assert_eq!(other.color, Color::White);
    }
}
