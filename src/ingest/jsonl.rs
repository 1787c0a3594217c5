//! JSON-lines observation source.
//!
//! Each non-blank line holds one `FrameObservation`. Malformed lines are
//! logged and skipped so a single bad record does not end a session.

use anyhow::{anyhow, Result};
use std::io::{BufRead, BufReader, Read};

use crate::frame::FrameObservation;

/// Path value that selects stdin.
pub const STDIN_PATH: &str = "-";

#[derive(Clone, Debug)]
pub struct JsonLinesConfig {
    /// Local file path, or `-` for stdin.
    pub path: String,
}

impl Default for JsonLinesConfig {
    fn default() -> Self {
        Self {
            path: STDIN_PATH.to_string(),
        }
    }
}

/// Statistics for a JSON-lines source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub frames_read: u64,
    pub lines_skipped: u64,
    pub path: String,
}

pub struct JsonLinesSource {
    config: JsonLinesConfig,
    reader: Option<Box<dyn BufRead>>,
    stats: SourceStats,
    exhausted: bool,
}

impl JsonLinesSource {
    pub fn new(config: JsonLinesConfig) -> Result<Self> {
        if config.path.trim().is_empty() {
            return Err(anyhow!("observation source path must not be empty"));
        }
        if config.path.contains("://") {
            return Err(anyhow!(
                "observation source only supports local paths or '-' (no URL schemes)"
            ));
        }
        let stats = SourceStats {
            path: config.path.clone(),
            ..SourceStats::default()
        };
        Ok(Self {
            config,
            reader: None,
            stats,
            exhausted: false,
        })
    }

    /// Wrap an arbitrary reader; used for tests and embedded pipelines.
    pub fn from_reader<R: Read + 'static>(name: &str, input: R) -> Self {
        Self {
            config: JsonLinesConfig {
                path: name.to_string(),
            },
            reader: Some(Box::new(BufReader::new(input))),
            stats: SourceStats {
                path: name.to_string(),
                ..SourceStats::default()
            },
            exhausted: false,
        }
    }

    /// Open the underlying file or stdin.
    pub fn connect(&mut self) -> Result<()> {
        if self.reader.is_some() {
            return Ok(());
        }
        let reader: Box<dyn BufRead> = if self.config.path == STDIN_PATH {
            Box::new(BufReader::new(std::io::stdin()))
        } else {
            let file = std::fs::File::open(&self.config.path).map_err(|e| {
                anyhow!(
                    "failed to open observation source {}: {}",
                    self.config.path,
                    e
                )
            })?;
            Box::new(BufReader::new(file))
        };
        self.reader = Some(reader);
        log::info!("JsonLinesSource: connected to {}", self.config.path);
        Ok(())
    }

    /// Next observation, or `None` at end of input.
    pub fn next_frame(&mut self) -> Result<Option<FrameObservation>> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| anyhow!("observation source not connected"))?;

        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                self.exhausted = true;
                return Ok(None);
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            // Decoding from bytes keeps invalid UTF-8 on the skip path.
            match serde_json::from_slice::<FrameObservation>(&line) {
                Ok(frame) => {
                    self.stats.frames_read += 1;
                    return Ok(Some(frame));
                }
                Err(e) => {
                    self.stats.lines_skipped += 1;
                    log::warn!(
                        "skipping malformed observation in {}: {}",
                        self.config.path,
                        e
                    );
                }
            }
        }
    }

    /// Healthy until the input is exhausted.
    pub fn is_healthy(&self) -> bool {
        self.reader.is_some() && !self.exhausted
    }

    pub fn stats(&self) -> SourceStats {
        self.stats.clone()
    }
}
