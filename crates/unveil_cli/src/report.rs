//! Report output model for scenario runs.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Component, Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// Machine-readable result of a scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub assertion: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
    pub steps_run: usize,
    pub elapsed_frames: u64,
    pub elapsed_ms: f64,
    /// Live bindings when the run ended
    pub bindings: usize,
    /// Registered listeners when the run ended
    pub listeners: usize,
}

/// Counters carried through a run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub steps_run: usize,
    pub elapsed_frames: u64,
    pub elapsed_ms: f64,
    pub bindings: usize,
    pub listeners: usize,
}

impl RunReport {
    pub fn passed(stats: RunStats) -> Self {
        Self {
            status: ReportStatus::Passed,
            failed_step_index: None,
            assertion: None,
            code: None,
            message: None,
            steps_run: stats.steps_run,
            elapsed_frames: stats.elapsed_frames,
            elapsed_ms: stats.elapsed_ms,
            bindings: stats.bindings,
            listeners: stats.listeners,
        }
    }

    pub fn failed(
        assertion: &str,
        failed_step_index: usize,
        code: String,
        message: String,
        stats: RunStats,
    ) -> Self {
        Self {
            status: ReportStatus::Failed,
            failed_step_index: Some(failed_step_index),
            assertion: Some(assertion.to_string()),
            code: Some(code),
            message: Some(message),
            ..Self::passed(stats)
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == ReportStatus::Passed
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        if path.is_absolute() || path.has_root() {
            bail!("report path must be relative and must not start with a separator");
        }
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            bail!("report path cannot contain '..' or drive prefixes");
        }
        let payload = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        std::fs::write(path, payload)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        Ok(())
    }

    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        writer.write_all(payload.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_report_serializes() {
        let report = RunReport::failed(
            "assert_text",
            3,
            "text_mismatch".to_string(),
            "stat: expected text '₹78000', got '₹0'".to_string(),
            RunStats {
                steps_run: 4,
                elapsed_frames: 10,
                elapsed_ms: 160.0,
                bindings: 1,
                listeners: 2,
            },
        );
        let mut out = Vec::new();
        report.write_to_writer(&mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["failed_step_index"], 3);
        assert_eq!(value["assertion"], "assert_text");
        assert_eq!(value["listeners"], 2);
    }

    #[test]
    fn test_report_path_must_be_relative() {
        let report = RunReport::passed(RunStats::default());
        assert!(report.write_to_path(Path::new("/tmp/report.json")).is_err());
        assert!(report.write_to_path(Path::new("../report.json")).is_err());
    }
}
