//! Summary of a finished run for headless output.
//!
//! `RunSummary` is what the silent and JSON modes print once a run ends,
//! either as colored text or as JSON.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::errors::{ErrorKind, SpeedDialError};
use crate::measurements::Measurements;
use crate::speedtest::phase::{Pacing, TestPhase};
use crate::speedtest::run::RunSnapshot;

/// Everything a headless run reports.
///
/// # Example
/// ```no_run
/// use speed_dial::results::RunSummary;
/// use speed_dial::speedtest::{ControllerConfig, RunSnapshot};
///
/// let summary = RunSummary::new(
///     ControllerConfig::discrete().pacing,
///     "random",
///     RunSnapshot::default(),
/// );
/// println!("{}", summary.to_json()?);
/// # Ok::<(), speed_dial::errors::SpeedDialError>(())
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// When the summary was taken
    pub timestamp: DateTime<Utc>,
    /// `discrete` or `continuous`
    pub variant: &'static str,
    /// `random` or `probe`
    pub sampler: &'static str,
    /// Whether the run finished on its own rather than being stopped
    pub completed: bool,
    /// Phase the run ended in
    pub phase: TestPhase,
    pub progress: f64,
    pub measurements: Measurements,
}

impl RunSummary {
    pub fn new(pacing: Pacing, sampler: &'static str, snapshot: RunSnapshot) -> Self {
        Self {
            timestamp: Utc::now(),
            variant: pacing.name(),
            sampler,
            completed: snapshot.phase == TestPhase::Done,
            phase: snapshot.phase,
            progress: snapshot.progress,
            measurements: snapshot.measurements,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SpeedDialError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            SpeedDialError::new(ErrorKind::Unknown, format!("Failed to serialize results: {}", e))
                .with_source(e)
        })
    }

    /// Human-readable report, one metric per line.
    pub fn to_text(&self) -> String {
        let m = &self.measurements;
        let status = if self.completed {
            "complete".bright_green()
        } else {
            "stopped".yellow()
        };

        let lines = [
            format!(
                "{} {} ({}, {} sampler)",
                "Speed test:".bold().white(),
                status,
                self.variant,
                self.sampler
            ),
            format!(
                "{} {}",
                "Download:".bold().white(),
                format!("{:.2} Mbps", m.download_mbps).bright_cyan()
            ),
            format!(
                "{} {}",
                "Upload:".bold().white(),
                format!("{:.2} Mbps", m.upload_mbps).bright_cyan()
            ),
            format!(
                "{} {}",
                "Ping:".bold().white(),
                format!("{:.2} ms", m.ping_ms).bright_blue()
            ),
            format!(
                "{} {}",
                "Idle Latency:".bold().white(),
                format!("{:.2} ms", m.idle_latency_ms).bright_blue()
            ),
            format!(
                "{} {}",
                "IP Type:".bold().white(),
                m.ip_type.to_string().bright_blue()
            ),
        ];

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurements::IpType;
    use crate::speedtest::config::ControllerConfig;

    fn finished_snapshot() -> RunSnapshot {
        RunSnapshot {
            running: false,
            phase: TestPhase::Done,
            progress: 100.0,
            measurements: Measurements {
                download_mbps: 500.0,
                upload_mbps: 250.0,
                ping_ms: 200.0,
                idle_latency_ms: 160.0,
                ip_type: IpType::IPv6,
            },
        }
    }

    #[test]
    fn test_completed_summary() {
        let summary =
            RunSummary::new(ControllerConfig::continuous().pacing, "probe", finished_snapshot());

        assert!(summary.completed);
        assert_eq!(summary.variant, "continuous");
        assert_eq!(summary.sampler, "probe");
        assert_eq!(summary.measurements.download_mbps, 500.0);
    }

    #[test]
    fn test_stopped_summary() {
        let snapshot = RunSnapshot {
            phase: TestPhase::Idle,
            ..finished_snapshot()
        };
        let summary = RunSummary::new(ControllerConfig::discrete().pacing, "random", snapshot);

        assert!(!summary.completed);
        assert_eq!(summary.variant, "discrete");
        assert!(summary.to_text().contains("stopped"));
    }

    #[test]
    fn test_json_serialization() {
        let summary =
            RunSummary::new(ControllerConfig::continuous().pacing, "probe", finished_snapshot());

        let json = summary.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["variant"], "continuous");
        assert_eq!(value["sampler"], "probe");
        assert_eq!(value["completed"], true);
        assert_eq!(value["phase"], "done");
        assert_eq!(value["progress"], 100.0);
        assert_eq!(value["measurements"]["download_mbps"], 500.0);
        assert_eq!(value["measurements"]["upload_mbps"], 250.0);
        assert_eq!(value["measurements"]["ping_ms"], 200.0);
        assert_eq!(value["measurements"]["idle_latency_ms"], 160.0);
        assert_eq!(value["measurements"]["ip_type"], "IPv6");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_text_lists_every_metric() {
        let summary =
            RunSummary::new(ControllerConfig::continuous().pacing, "probe", finished_snapshot());
        let text = summary.to_text();

        assert!(text.contains("500.00 Mbps"));
        assert!(text.contains("250.00 Mbps"));
        assert!(text.contains("200.00 ms"));
        assert!(text.contains("160.00 ms"));
        assert!(text.contains("IPv6"));
        assert!(text.contains("complete"));
    }
}
