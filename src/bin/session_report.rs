//! session_report - summarize capture logs into posture reports

use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use posture_monitor::config::MonitorConfig;
use posture_monitor::report::{capture_logs_in, report_for_log, write_report};

#[path = "../ui.rs"]
#[allow(dead_code)]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory of capture logs (defaults to the configured log dir).
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Summarize a single capture log instead of a directory.
    #[arg(long, conflicts_with = "log_dir")]
    input: Option<PathBuf>,
    /// Print reports to stdout instead of writing `.txt` files.
    #[arg(long)]
    stdout: bool,
    /// Seconds of capture warm-up before the first record.
    #[arg(long)]
    start_offset_secs: Option<u64>,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let is_tty = std::io::stderr().is_terminal();
    let stdout_is_tty = std::io::stdout().is_terminal();
    let ui = ui::Ui::from_args(Some(&args.ui), is_tty, !stdout_is_tty);

    let cfg = MonitorConfig::load()?;
    let mut settings = cfg.report;
    if let Some(offset) = args.start_offset_secs {
        settings.start_offset_secs = offset;
    }

    let logs = match &args.input {
        Some(path) => vec![path.clone()],
        None => {
            let dir = args.log_dir.clone().unwrap_or_else(|| cfg.log_dir.clone());
            let _stage = ui.stage("Scan capture logs");
            capture_logs_in(&dir)?
        }
    };
    if logs.is_empty() {
        return Err(anyhow!("no capture logs (*.csv) found"));
    }

    for path in &logs {
        let _stage = ui.stage(&format!("Summarize {}", path.display()));
        if args.stdout {
            let report = report_for_log(path, &settings)?;
            println!("== {}", path.display());
            println!("{}", report);
        } else {
            let out = write_report(path, &settings)?;
            println!("report written to {}", out.display());
        }
    }
    Ok(())
}
