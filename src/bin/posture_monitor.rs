//! posture_monitor - classify a stream of pose observations
//!
//! This binary:
//! 1. Reads one `FrameObservation` per line from a file or stdin
//! 2. Classifies each frame with a single per-stream monitor
//! 3. Appends the counter snapshot to a time-stamped capture log
//! 4. Stops at end of input or on Ctrl-C and prints the final record as JSON

use anyhow::{anyhow, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, IsTerminal};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use posture_monitor::annotate::LogSink;
use posture_monitor::capture::{parse_clock, wall_clock_now, CaptureLogWriter, CaptureRecord};
use posture_monitor::config::MonitorConfig;
use posture_monitor::ingest::{JsonLinesConfig, JsonLinesSource};

#[path = "../ui.rs"]
mod ui;

const DEFAULT_CAPTURE_FILE: &str = "session.csv";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Observation stream as JSON lines; `-` reads stdin.
    #[arg(long, default_value = "-")]
    input: String,
    /// Capture log path (defaults to <log_dir>/session.csv).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Route overlay text to the debug log.
    #[arg(long)]
    annotate: bool,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let is_tty = std::io::stderr().is_terminal();
    let ui = ui::Ui::from_args(Some(&args.ui), is_tty, false);

    let cfg = {
        let _stage = ui.stage("Load config");
        MonitorConfig::load()?
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| cfg.log_dir.join(DEFAULT_CAPTURE_FILE));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow!("failed to create {}: {}", parent.display(), e))?;
    }

    let mut source = {
        let _stage = ui.stage("Open observation source");
        let mut source = JsonLinesSource::new(JsonLinesConfig {
            path: args.input.clone(),
        })?;
        source.connect()?;
        source
    };
    let file = File::create(&output)
        .map_err(|e| anyhow!("failed to create capture log {}: {}", output.display(), e))?;
    let mut writer = CaptureLogWriter::new(BufWriter::new(file))?.flush_each_row();

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        // Second Ctrl-C aborts while blocked on input; rows are flushed as written.
        if !flag.swap(false, Ordering::SeqCst) {
            std::process::exit(130);
        }
        log::warn!("stop requested; finishing current frame (Ctrl-C again to abort)");
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    let mut monitor = cfg.monitor();
    let ticker = ui.frame_ticker();
    log::info!(
        "posture_monitor running. reading {} writing {}",
        args.input,
        output.display()
    );

    while running.load(Ordering::SeqCst) {
        let Some(frame) = source.next_frame()? else {
            break;
        };

        let time = match frame.timestamp.as_deref() {
            Some(ts) if parse_clock(ts).is_ok() => ts.to_string(),
            Some(ts) => {
                log::warn!("ignoring invalid frame timestamp {:?}; using wall clock", ts);
                wall_clock_now()?
            }
            None => wall_clock_now()?,
        };

        let metrics = if args.annotate {
            monitor.observe_annotated(&frame, &mut LogSink)
        } else {
            monitor.observe(&frame)
        };
        writer.append(&CaptureRecord::new(time, metrics))?;
        ticker.update(metrics.tick, metrics.tock);

        if cfg.summary_every_frames > 0 && metrics.tick % cfg.summary_every_frames == 0 {
            log::info!(
                "frames={} valid={} head={}/{} neck={}/{} back={}/{}",
                metrics.tick,
                metrics.tock,
                metrics.head_high,
                metrics.head_low,
                metrics.neck_forward,
                metrics.neck_backward,
                metrics.back_forward,
                metrics.back_backward
            );
        }
    }

    writer.flush()?;
    let metrics = monitor.metrics();
    ticker.finish(metrics.tick, metrics.tock);

    let stats = source.stats();
    log::info!(
        "session finished: {} frames read, {} lines skipped, {} rows written to {}",
        stats.frames_read,
        stats.lines_skipped,
        writer.rows(),
        output.display()
    );
    println!("{}", serde_json::to_string(&metrics)?);
    Ok(())
}
