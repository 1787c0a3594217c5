use serde::{Deserialize, Serialize};

use super::classifier::FrameAssessment;
use super::segment::Cue;

/// Session-lifetime counters; also the per-frame metrics record.
///
/// Every field is monotonically non-decreasing and moves by at most one per
/// recorded frame. Neck and back counters are keyed by the cue shown
/// (`neck_forward` counts "Bend neck forward!" frames). Head counters
/// describe where the head was held: `head_high` counts frames cued
/// "Tilt head down!".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureMetrics {
    /// Frames observed.
    pub tick: u64,
    /// Frames valid for measurement.
    pub tock: u64,
    /// Head held too high; cued "Tilt head down!".
    pub head_high: u64,
    /// Head held too low; cued "Tilt head up!".
    pub head_low: u64,
    /// Cued "Bend neck forward!".
    pub neck_forward: u64,
    /// Cued "Bend neck backward!".
    pub neck_backward: u64,
    /// Cued "Sit forward!".
    pub back_forward: u64,
    /// Cued "Sit backward!".
    pub back_backward: u64,
}

/// Column order used by the capture log.
pub const METRIC_COLUMNS: [&str; 8] = [
    "tick",
    "tock",
    "head_high",
    "head_low",
    "neck_forward",
    "neck_backward",
    "back_forward",
    "back_backward",
];

impl PostureMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame into the counters.
    ///
    /// Deviations only count on valid frames so unreliable geometry never
    /// reaches the cumulative statistics.
    pub fn record(&mut self, assessment: &FrameAssessment) {
        self.tick += 1;
        if !assessment.is_valid() {
            return;
        }
        self.tock += 1;
        for reading in assessment.readings() {
            if let Some(cue) = reading.verdict.cue() {
                *self.slot(cue) += 1;
            }
        }
    }

    fn slot(&mut self, cue: Cue) -> &mut u64 {
        match cue {
            Cue::TiltHeadDown => &mut self.head_high,
            Cue::TiltHeadUp => &mut self.head_low,
            Cue::BendNeckForward => &mut self.neck_forward,
            Cue::BendNeckBackward => &mut self.neck_backward,
            Cue::SitForward => &mut self.back_forward,
            Cue::SitBackward => &mut self.back_backward,
        }
    }

    /// Values in `METRIC_COLUMNS` order.
    pub fn values(&self) -> [u64; 8] {
        [
            self.tick,
            self.tock,
            self.head_high,
            self.head_low,
            self.neck_forward,
            self.neck_backward,
            self.back_forward,
            self.back_backward,
        ]
    }

    pub fn from_values(values: [u64; 8]) -> Self {
        let [tick, tock, head_high, head_low, neck_forward, neck_backward, back_forward, back_backward] =
            values;
        Self {
            tick,
            tock,
            head_high,
            head_low,
            neck_forward,
            neck_backward,
            back_forward,
            back_backward,
        }
    }

    /// Start a new session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
