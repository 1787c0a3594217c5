//! Time-stamped capture log of metrics records.
//!
//! One CSV row per classified frame:
//! `time,tick,tock,head_high,head_low,neck_forward,neck_backward,back_forward,back_backward`
//! where `time` is a wall-clock `HH:MM:SS`. The session report only needs the
//! first and last data rows, so the reader keeps just those.

use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::posture::{PostureMetrics, METRIC_COLUMNS};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Parse `H:MM:SS` (hours may exceed two digits) into seconds.
pub fn parse_clock(value: &str) -> Result<u64> {
    static CLOCK_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = CLOCK_RE
        .get_or_init(|| regex::Regex::new(r"^(\d+):([0-5]?\d):([0-5]?\d)$").unwrap());

    let caps = re
        .captures(value.trim())
        .ok_or_else(|| anyhow!("invalid clock time {:?}, expected HH:MM:SS", value))?;
    let field = |i: usize| -> Result<u64> {
        caps[i]
            .parse::<u64>()
            .map_err(|e| anyhow!("invalid clock time {:?}: {}", value, e))
    };
    let (hours, minutes, seconds) = (field(1)?, field(2)?, field(3)?);
    hours
        .checked_mul(3600)
        .and_then(|secs| secs.checked_add(minutes * 60 + seconds))
        .ok_or_else(|| anyhow!("clock time {:?} is out of range", value))
}

pub fn format_clock(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

/// Current UTC time of day as `HH:MM:SS`.
pub fn wall_clock_now() -> Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    Ok(format_clock(now % SECONDS_PER_DAY))
}

/// One capture-log row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureRecord {
    pub time: String,
    pub metrics: PostureMetrics,
}

impl CaptureRecord {
    pub fn new(time: impl Into<String>, metrics: PostureMetrics) -> Self {
        Self {
            time: time.into(),
            metrics,
        }
    }

    /// Seconds since midnight (or since hour zero for longer clocks).
    pub fn seconds(&self) -> Result<u64> {
        parse_clock(&self.time)
    }

    fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != METRIC_COLUMNS.len() + 1 {
            return Err(anyhow!(
                "expected {} columns, found {}",
                METRIC_COLUMNS.len() + 1,
                fields.len()
            ));
        }
        let mut values = [0u64; 8];
        for (slot, (raw, name)) in values
            .iter_mut()
            .zip(fields[1..].iter().zip(METRIC_COLUMNS))
        {
            *slot = raw
                .parse()
                .map_err(|_| anyhow!("column {} is not an integer: {:?}", name, raw))?;
        }
        Ok(Self {
            time: fields[0].to_string(),
            metrics: PostureMetrics::from_values(values),
        })
    }

    fn to_line(&self) -> String {
        let mut line = self.time.clone();
        for value in self.metrics.values() {
            line.push(',');
            line.push_str(&value.to_string());
        }
        line
    }
}

pub fn header_line() -> String {
    format!("time,{}", METRIC_COLUMNS.join(","))
}

/// Appends capture rows, writing the header first.
pub struct CaptureLogWriter<W: Write> {
    out: W,
    rows: u64,
    flush_each_row: bool,
}

impl<W: Write> CaptureLogWriter<W> {
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "{}", header_line())?;
        Ok(Self {
            out,
            rows: 0,
            flush_each_row: false,
        })
    }

    /// Flush after every appended row, so an abrupt exit loses nothing
    /// already recorded.
    pub fn flush_each_row(mut self) -> Self {
        self.flush_each_row = true;
        self
    }

    pub fn append(&mut self, record: &CaptureRecord) -> Result<()> {
        writeln!(self.out, "{}", record.to_line())?;
        self.rows += 1;
        if self.flush_each_row {
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// First and last data rows of a capture log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureSpan {
    pub first: Option<CaptureRecord>,
    pub last: Option<CaptureRecord>,
    pub rows: u64,
}

impl CaptureSpan {
    /// Read a log, skipping the header and blank lines.
    ///
    /// A single data row sets `first` only; `last` needs a second row.
    pub fn read<R: Read>(input: R) -> Result<Self> {
        let mut span = CaptureSpan::default();
        let reader = BufReader::new(input);
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if index == 0 || line.trim().is_empty() {
                continue;
            }
            let record = CaptureRecord::parse(&line)
                .with_context(|| format!("capture log line {}", index + 1))?;
            span.rows += 1;
            if span.first.is_none() {
                span.first = Some(record);
            } else {
                span.last = Some(record);
            }
        }
        Ok(span)
    }

    pub fn read_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| anyhow!("failed to open capture log {}: {}", path.display(), e))?;
        Self::read(file).with_context(|| format!("invalid capture log {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_round_trips_through_seconds() {
        assert_eq!(parse_clock("00:01:10").unwrap(), 70);
        assert_eq!(parse_clock("1:00:00").unwrap(), 3600);
        assert_eq!(format_clock(3725), "01:02:05");
        assert!(parse_clock("10:61:00").is_err());
        assert!(parse_clock("noon").is_err());
    }

    #[test]
    fn oversized_hours_are_rejected() {
        let err = parse_clock("99999999999999999:00:00").unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(parse_clock("99999999999999999999:00:00").is_err());
    }

    #[test]
    fn writer_output_reads_back_as_span() -> Result<()> {
        let mut writer = CaptureLogWriter::new(Vec::new())?;
        for tick in 1..=3 {
            let metrics = PostureMetrics {
                tick,
                tock: tick - 1,
                ..Default::default()
            };
            writer.append(&CaptureRecord::new(format_clock(10 + tick), metrics))?;
        }
        assert_eq!(writer.rows(), 3);
        let bytes = writer.into_inner();
        let text = String::from_utf8(bytes.clone())?;
        assert!(text.starts_with("time,tick,tock,head_high"));

        let span = CaptureSpan::read(bytes.as_slice())?;
        assert_eq!(span.rows, 3);
        assert_eq!(span.first.as_ref().unwrap().time, "00:00:11");
        assert_eq!(span.last.as_ref().unwrap().metrics.tick, 3);
        Ok(())
    }

    #[test]
    fn flush_each_row_reaches_the_sink() -> Result<()> {
        let metrics = PostureMetrics {
            tick: 1,
            ..Default::default()
        };
        let mut buffered = CaptureLogWriter::new(std::io::BufWriter::new(Vec::new()))?;
        buffered.append(&CaptureRecord::new("00:00:01", metrics))?;
        assert!(buffered.get_ref().get_ref().is_empty());

        let mut eager =
            CaptureLogWriter::new(std::io::BufWriter::new(Vec::new()))?.flush_each_row();
        eager.append(&CaptureRecord::new("00:00:01", metrics))?;
        let text = String::from_utf8(eager.get_ref().get_ref().clone())?;
        assert!(text.ends_with("00:00:01,1,0,0,0,0,0,0,0\n"));
        Ok(())
    }

    #[test]
    fn single_row_has_no_last() -> Result<()> {
        let log = "time,tick,tock,head_high,head_low,neck_forward,neck_backward,back_forward,back_backward\n\
                   00:00:10,1,1,0,0,0,0,0,0\n";
        let span = CaptureSpan::read(log.as_bytes())?;
        assert!(span.first.is_some());
        assert!(span.last.is_none());
        Ok(())
    }

    #[test]
    fn malformed_row_names_the_line() {
        let log = "header\n00:00:10,1,1,0,0,x,0,0,0\n";
        let err = CaptureSpan::read(log.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
        assert!(format!("{:#}", err).contains("neck_forward"));
    }
}
