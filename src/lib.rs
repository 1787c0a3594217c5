//! Seated posture monitor
//!
//! Classifies a seated person's posture from 2-D pose keypoints, one frame at
//! a time, and summarizes a session into a short report.
//!
//! # Pipeline
//!
//! 1. **Project**: relative keypoints become integer pixel positions.
//! 2. **Filter**: keypoints under the score threshold are dropped.
//! 3. **Side**: the better-observed body half (left or right) is measured.
//! 4. **Scale**: one unit is a tenth of the ear-to-shoulder distance.
//! 5. **Classify**: head, neck and back offsets are compared to side-keyed
//!    bounds, producing a corrective cue per segment.
//! 6. **Count**: cumulative counters record frames seen, valid frames and
//!    each deviation direction.
//!
//! # Module Structure
//!
//! - `keypoint`: body parts, projection, confidence filtering
//! - `frame`: the per-frame observation handed over by the pose pipeline
//! - `posture`: side selection, rule table, classifier and counters
//! - `annotate`: overlay text for a classified frame
//! - `ingest`: JSON-lines observation sources
//! - `capture`: time-stamped capture log (CSV)
//! - `report`: session report from a capture log
//! - `config`: monitor configuration (file + env overrides)

pub mod annotate;
pub mod capture;
pub mod config;
pub mod frame;
pub mod ingest;
pub mod keypoint;
pub mod posture;
pub mod report;

pub use annotate::{Annotation, Color, FrameAnnotator, LogSink, TextSink};
pub use capture::{CaptureLogWriter, CaptureRecord, CaptureSpan};
pub use config::MonitorConfig;
pub use frame::{FrameObservation, SubjectObservation};
pub use keypoint::{BodyPart, ImageSize, Keypoint, KeypointSet, PixelPoint};
pub use posture::{
    FrameAssessment, FrameIssue, PostureClassifier, PostureMetrics, PostureMonitor, Segment,
    SegmentVerdict, Side,
};
pub use report::{ReportSettings, SessionReport};
