//! Observation sources.
//!
//! The pose-estimation pipeline runs out of process and hands over one
//! `FrameObservation` per frame. Sources here only decode that hand-off:
//! - JSON lines from a local file
//! - JSON lines from stdin (`-`)
//!
//! Sources MUST NOT reorder frames; the classifier relies on arrival order
//! for its cumulative counters.

pub mod jsonl;

pub use jsonl::{JsonLinesConfig, JsonLinesSource, SourceStats};
