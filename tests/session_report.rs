use std::io::Write;

use posture_monitor::capture::{CaptureLogWriter, CaptureRecord, CaptureSpan};
use posture_monitor::posture::{PostureMetrics, Segment};
use posture_monitor::report::{
    capture_logs_in, report_for_log, write_report, ReportSettings, SessionReport, TOO_SHORT_NOTICE,
};

fn metrics(values: [u64; 8]) -> PostureMetrics {
    PostureMetrics::from_values(values)
}

fn one_minute_log() -> Vec<u8> {
    let mut writer = CaptureLogWriter::new(Vec::new()).expect("header");
    writer
        .append(&CaptureRecord::new("00:00:10", metrics([1, 1, 0, 0, 0, 0, 0, 0])))
        .expect("first row");
    writer
        .append(&CaptureRecord::new("00:00:40", metrics([30, 29, 0, 0, 3, 0, 0, 0])))
        .expect("middle row");
    writer
        .append(&CaptureRecord::new("00:01:10", metrics([61, 60, 0, 0, 6, 0, 0, 0])))
        .expect("last row");
    writer.into_inner()
}

fn summary(report: SessionReport) -> posture_monitor::report::SessionSummary {
    match report {
        SessionReport::Summary(summary) => summary,
        SessionReport::TooShort => panic!("expected a summary"),
    }
}

#[test]
fn one_minute_session_without_warm_up() {
    let span = CaptureSpan::read(one_minute_log().as_slice()).expect("read log");
    assert_eq!(span.rows, 3);

    let settings = ReportSettings {
        start_offset_secs: 0,
        ..Default::default()
    };
    let summary = summary(SessionReport::from_span(&span, &settings).expect("report"));

    assert_eq!(summary.elapsed_secs, 60);
    assert_eq!(summary.seconds_per_tick, 0.9836);
    assert!((summary.valid_capture_secs - 59.016).abs() < 1e-9);
    let neck = summary
        .deviations
        .iter()
        .find(|d| d.label == "Neck cued to bend forward")
        .expect("neck row");
    assert_eq!(neck.frames, 6);
    assert!((neck.seconds - 5.9016).abs() < 1e-9);
    assert!(summary.concerns.is_empty());
}

#[test]
fn default_warm_up_extends_elapsed_time() {
    let span = CaptureSpan::read(one_minute_log().as_slice()).expect("read log");
    let report = SessionReport::from_span(&span, &ReportSettings::default()).expect("report");
    let text = report.to_string();
    let summary = summary(report);

    assert_eq!(summary.elapsed_secs, 70);
    assert_eq!(summary.seconds_per_tick, 1.1475);
    assert!(summary.concerns.is_empty());
    assert!(text.starts_with("Time elapsed: 70s"));
    let neck_line = format!("Neck cued to bend forward - {:.2}s", 6.0 * 1.1475);
    assert!(text.contains(&neck_line));
    assert!(text.contains("No areas of concern"));
}

#[test]
fn heavy_neck_deviation_is_flagged() {
    let first = CaptureRecord::new("10:00:00", metrics([1, 1, 0, 0, 0, 0, 0, 0]));
    let last = CaptureRecord::new("10:02:00", metrics([120, 100, 0, 0, 0, 21, 0, 0]));
    let summary = summary(
        SessionReport::from_records(&first, &last, &ReportSettings::default()).expect("report"),
    );
    assert_eq!(summary.concerns, vec![Segment::Neck]);
}

#[test]
fn short_logs_report_a_notice() {
    let header_only = "time,tick,tock,head_high,head_low,neck_forward,neck_backward,back_forward,back_backward\n";
    let span = CaptureSpan::read(header_only.as_bytes()).expect("read log");
    let report = SessionReport::from_span(&span, &ReportSettings::default()).expect("report");
    assert!(report.is_too_short());

    let single = format!("{}00:00:10,1,1,0,0,0,0,0,0\n", header_only);
    let span = CaptureSpan::read(single.as_bytes()).expect("read log");
    let report = SessionReport::from_span(&span, &ReportSettings::default()).expect("report");
    assert_eq!(report.to_string(), TOO_SHORT_NOTICE);
}

#[test]
fn batch_writes_reports_next_to_logs() {
    let dir = tempfile::tempdir().expect("temp dir");
    for name in ["b_session.csv", "a_session.csv"] {
        let mut file = std::fs::File::create(dir.path().join(name)).expect("create log");
        file.write_all(&one_minute_log()).expect("write log");
    }
    std::fs::write(dir.path().join("notes.md"), "not a log").expect("write notes");

    let logs = capture_logs_in(dir.path()).expect("scan");
    let names: Vec<_> = logs
        .iter()
        .filter_map(|p| p.file_name()?.to_str())
        .collect();
    assert_eq!(names, vec!["a_session.csv", "b_session.csv"]);

    for log in &logs {
        let out = write_report(log, &ReportSettings::default()).expect("write report");
        assert_eq!(out, log.with_extension("txt"));
        let text = std::fs::read_to_string(&out).expect("read report");
        assert_eq!(
            text,
            report_for_log(log, &ReportSettings::default())
                .expect("report")
                .to_string()
        );
    }
}

#[test]
fn malformed_log_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp log");
    writeln!(file, "time,tick").expect("write");
    writeln!(file, "00:00:10,1").expect("write");
    assert!(report_for_log(file.path(), &ReportSettings::default()).is_err());
}

#[test]
fn corrupted_timestamp_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp log");
    writeln!(
        file,
        "time,tick,tock,head_high,head_low,neck_forward,neck_backward,back_forward,back_backward"
    )
    .expect("write");
    writeln!(file, "00:00:10,1,1,0,0,0,0,0,0").expect("write");
    writeln!(file, "99999999999999999:00:00,61,60,0,0,6,0,0,0").expect("write");

    let err = report_for_log(file.path(), &ReportSettings::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("out of range"));
}
