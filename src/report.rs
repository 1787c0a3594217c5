//! Session report from a capture log.
//!
//! Only the first and last records matter. Elapsed time runs from the first
//! record minus a start offset (the capture warm-up) to the last record; each
//! tick is then worth `elapsed / tick` seconds, which converts every counter
//! into time spent. A segment is flagged when either of its counters exceeds
//! the concern fraction of valid frames.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::capture::{CaptureRecord, CaptureSpan};
use crate::posture::{PostureMetrics, Segment};

pub const DEFAULT_START_OFFSET_SECS: u64 = 10;
pub const DEFAULT_CONCERN_FRACTION: f64 = 0.2;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

pub const TOO_SHORT_NOTICE: &str = "Input too short! Try taking another reading.";
pub const COUNTER_NOTE: &str =
    "(Head rows describe where the head was held; neck and back rows describe the cue shown.)";
const DISCLAIMER: &str =
    "Please note this is not a certified medical tool and should only be used as a general guideline.";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReportSettings {
    pub start_offset_secs: u64,
    pub concern_fraction: f64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            start_offset_secs: DEFAULT_START_OFFSET_SECS,
            concern_fraction: DEFAULT_CONCERN_FRACTION,
        }
    }
}

/// Time attributed to one counter.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviationTime {
    pub segment: Segment,
    pub label: &'static str,
    pub frames: u64,
    pub seconds: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub elapsed_secs: u64,
    pub seconds_per_tick: f64,
    pub valid_capture_secs: f64,
    pub deviations: Vec<DeviationTime>,
    /// Segments worth working on, in head, neck, back order.
    pub concerns: Vec<Segment>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionReport {
    /// Fewer than two distinct records, or no frames at all.
    TooShort,
    Summary(SessionSummary),
}

fn counter_rows(m: &PostureMetrics) -> [(Segment, &'static str, u64); 6] {
    [
        (Segment::Head, "Head tilted too high", m.head_high),
        (Segment::Head, "Head tilted too low", m.head_low),
        (Segment::Neck, "Neck cued to bend forward", m.neck_forward),
        (Segment::Neck, "Neck cued to bend backward", m.neck_backward),
        (Segment::Back, "Back cued to sit forward", m.back_forward),
        (Segment::Back, "Back cued to sit backward", m.back_backward),
    ]
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

impl SessionReport {
    pub fn from_span(span: &CaptureSpan, settings: &ReportSettings) -> Result<Self> {
        match (&span.first, &span.last) {
            (Some(first), Some(last)) => Self::from_records(first, last, settings),
            _ => Ok(SessionReport::TooShort),
        }
    }

    pub fn from_records(
        first: &CaptureRecord,
        last: &CaptureRecord,
        settings: &ReportSettings,
    ) -> Result<Self> {
        if first == last || last.metrics.tick == 0 {
            return Ok(SessionReport::TooShort);
        }

        let start = first.seconds().context("first record")?;
        let mut end = last.seconds().context("last record")?;
        if end < start {
            // Session ran past midnight.
            end = end
                .checked_add(SECONDS_PER_DAY)
                .ok_or_else(|| anyhow!("last record time is out of range"))?;
        }
        let elapsed_secs = end
            .checked_add(settings.start_offset_secs)
            .and_then(|secs| secs.checked_sub(start))
            .ok_or_else(|| anyhow!("session span is out of range"))?;

        let m = &last.metrics;
        let seconds_per_tick = round4(elapsed_secs as f64 / m.tick as f64);
        let valid_capture_secs = m.tock as f64 * seconds_per_tick;
        let worry = m.tock as f64 * settings.concern_fraction;

        let mut deviations = Vec::with_capacity(6);
        let mut concerns = Vec::new();
        for (segment, label, frames) in counter_rows(m) {
            deviations.push(DeviationTime {
                segment,
                label,
                frames,
                seconds: frames as f64 * seconds_per_tick,
            });
            if frames as f64 > worry && !concerns.contains(&segment) {
                concerns.push(segment);
            }
        }

        Ok(SessionReport::Summary(SessionSummary {
            elapsed_secs,
            seconds_per_tick,
            valid_capture_secs,
            deviations,
            concerns,
        }))
    }

    pub fn is_too_short(&self) -> bool {
        matches!(self, SessionReport::TooShort)
    }
}

fn concern_line(segment: Segment) -> &'static str {
    match segment {
        Segment::Head => "Consider working on your head angle!",
        Segment::Neck => "Consider working on straightening your neck!",
        Segment::Back => "Consider working on straightening your back!",
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = match self {
            SessionReport::TooShort => return write!(f, "{}", TOO_SHORT_NOTICE),
            SessionReport::Summary(summary) => summary,
        };
        writeln!(f, "Time elapsed: {}s", summary.elapsed_secs)?;
        writeln!(
            f,
            "Estimated valid capture time: {:.2}s",
            summary.valid_capture_secs
        )?;
        writeln!(f)?;
        writeln!(f, "Time Spent with:")?;
        for dev in &summary.deviations {
            writeln!(f, "{} - {:.2}s", dev.label, dev.seconds)?;
        }
        writeln!(f, "{}", COUNTER_NOTE)?;
        writeln!(f)?;
        writeln!(f, "Evaluation:")?;
        if summary.concerns.is_empty() {
            writeln!(f, "No areas of concern; keep up the good posture!")?;
        }
        for segment in &summary.concerns {
            writeln!(f, "{}", concern_line(*segment))?;
        }
        writeln!(f)?;
        write!(f, "{}", DISCLAIMER)
    }
}

/// Build the report for one capture log.
pub fn report_for_log(path: &Path, settings: &ReportSettings) -> Result<SessionReport> {
    let span = CaptureSpan::read_path(path)?;
    SessionReport::from_span(&span, settings)
        .with_context(|| format!("failed to summarize {}", path.display()))
}

/// Capture logs (`*.csv`) in a directory, sorted by name.
pub fn capture_logs_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| anyhow!("failed to read log directory {}: {}", dir.display(), e))?;
    let mut logs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            logs.push(path);
        }
    }
    logs.sort();
    Ok(logs)
}

/// Write a sibling `.txt` report next to a capture log.
pub fn write_report(path: &Path, settings: &ReportSettings) -> Result<PathBuf> {
    let report = report_for_log(path, settings)?;
    let out = path.with_extension("txt");
    std::fs::write(&out, report.to_string())
        .map_err(|e| anyhow!("failed to write report {}: {}", out.display(), e))?;
    log::info!("session report written to {}", out.display());
    Ok(out)
}
