use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::keypoint::DEFAULT_SCORE_THRESHOLD;
use crate::posture::classifier::DEFAULT_TORSO_RATIO;
use crate::posture::{PostureClassifier, PostureMonitor};
use crate::report::{ReportSettings, DEFAULT_CONCERN_FRACTION, DEFAULT_START_OFFSET_SECS};

const DEFAULT_LOG_DIR: &str = "log";
const DEFAULT_SUMMARY_EVERY_FRAMES: u64 = 30;

#[derive(Debug, Deserialize, Default)]
struct MonitorConfigFile {
    log_dir: Option<PathBuf>,
    classifier: Option<ClassifierConfigFile>,
    report: Option<ReportConfigFile>,
    summary_every_frames: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct ClassifierConfigFile {
    keypoint_threshold: Option<f32>,
    torso_ratio: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct ReportConfigFile {
    start_offset_secs: Option<u64>,
    concern_fraction: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub log_dir: PathBuf,
    pub classifier: ClassifierSettings,
    pub report: ReportSettings,
    /// Log a counter summary every N frames; 0 disables it.
    pub summary_every_frames: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierSettings {
    pub keypoint_threshold: f32,
    pub torso_ratio: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::from_file(MonitorConfigFile::default())
    }
}

impl MonitorConfig {
    /// Load from `POSTURE_CONFIG` (JSON, or TOML by extension), then apply
    /// environment overrides and validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("POSTURE_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: MonitorConfigFile) -> Self {
        let classifier = ClassifierSettings {
            keypoint_threshold: file
                .classifier
                .as_ref()
                .and_then(|c| c.keypoint_threshold)
                .unwrap_or(DEFAULT_SCORE_THRESHOLD),
            torso_ratio: file
                .classifier
                .as_ref()
                .and_then(|c| c.torso_ratio)
                .unwrap_or(DEFAULT_TORSO_RATIO),
        };
        let report = ReportSettings {
            start_offset_secs: file
                .report
                .as_ref()
                .and_then(|r| r.start_offset_secs)
                .unwrap_or(DEFAULT_START_OFFSET_SECS),
            concern_fraction: file
                .report
                .as_ref()
                .and_then(|r| r.concern_fraction)
                .unwrap_or(DEFAULT_CONCERN_FRACTION),
        };
        Self {
            log_dir: file
                .log_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            classifier,
            report,
            summary_every_frames: file
                .summary_every_frames
                .unwrap_or(DEFAULT_SUMMARY_EVERY_FRAMES),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("POSTURE_LOG_DIR") {
            if !dir.trim().is_empty() {
                self.log_dir = PathBuf::from(dir);
            }
        }
        if let Some(threshold) = env_number::<f32>("POSTURE_KEYPOINT_THRESHOLD")? {
            self.classifier.keypoint_threshold = threshold;
        }
        if let Some(ratio) = env_number::<f64>("POSTURE_TORSO_RATIO")? {
            self.classifier.torso_ratio = ratio;
        }
        if let Some(fraction) = env_number::<f64>("POSTURE_CONCERN_FRACTION")? {
            self.report.concern_fraction = fraction;
        }
        if let Some(offset) = env_number::<u64>("POSTURE_START_OFFSET_SECS")? {
            self.report.start_offset_secs = offset;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let threshold = self.classifier.keypoint_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(anyhow!(
                "keypoint_threshold must be within [0, 1], got {}",
                threshold
            ));
        }
        let ratio = self.classifier.torso_ratio;
        if ratio.is_nan() || ratio <= 0.0 {
            return Err(anyhow!("torso_ratio must be greater than zero"));
        }
        let fraction = self.report.concern_fraction;
        if fraction.is_nan() || fraction <= 0.0 || fraction > 1.0 {
            return Err(anyhow!(
                "concern_fraction must be within (0, 1], got {}",
                fraction
            ));
        }
        Ok(())
    }

    /// A fresh per-stream monitor using these settings.
    pub fn monitor(&self) -> PostureMonitor {
        let classifier = PostureClassifier::new().with_torso_ratio(self.classifier.torso_ratio);
        PostureMonitor::new(classifier).with_score_threshold(self.classifier.keypoint_threshold)
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("{} must be a number, got {:?}", key, raw)),
        _ => Ok(None),
    }
}

fn read_config_file(path: &Path) -> Result<MonitorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classifier_constants() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.classifier.keypoint_threshold, 0.5);
        assert_eq!(cfg.classifier.torso_ratio, 4.0);
        assert_eq!(cfg.report, ReportSettings::default());
        assert_eq!(cfg.log_dir, PathBuf::from("log"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut cfg = MonitorConfig::default();
        cfg.classifier.keypoint_threshold = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = MonitorConfig::default();
        cfg.report.concern_fraction = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = MonitorConfig::default();
        cfg.classifier.torso_ratio = f64::NAN;
        assert!(cfg.validate().is_err());
    }
}
