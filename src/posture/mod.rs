//! Per-frame seated posture classification.
//!
//! Landmarks flow through side selection, scale normalization and segment
//! classification; verdicts then drive the session counters:
//!
//! - `side`: which body half is measured this frame
//! - `segment`: `Unit`, the side-keyed rule table, per-segment verdicts
//! - `classifier`: `PostureClassifier` (stateless) and `PostureMonitor`
//!   (classifier plus counters, one per stream)
//! - `counters`: `PostureMetrics`, the cumulative record

pub mod classifier;
pub mod counters;
pub mod segment;
pub mod side;

pub use classifier::{FrameAssessment, FrameIssue, PostureClassifier, PostureMonitor};
pub use counters::{PostureMetrics, METRIC_COLUMNS};
pub use segment::{Cue, Segment, SegmentReading, SegmentRule, SegmentVerdict, Unit};
pub use side::{select_side, Side, SideSelection};
