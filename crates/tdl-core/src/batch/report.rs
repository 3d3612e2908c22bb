//! Run summary rendering and the optional JSON report.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

use crate::item::{ItemResult, RunSummary};

const BOX_WIDTH: usize = 60;

/// Everything a finished run produced, as written to `--report`.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub output_dir: &'a Path,
    pub summary: RunSummary,
    pub success_rate: f64,
    pub items: &'a [ItemResult],
}

impl<'a> RunReport<'a> {
    pub fn new(output_dir: &'a Path, items: &'a [ItemResult]) -> Self {
        let summary = RunSummary::from_results(items);
        Self {
            output_dir,
            summary,
            success_rate: summary.success_rate(),
            items,
        }
    }
}

/// Writes the report as pretty JSON, replacing any existing file.
pub fn write_json_report(path: &Path, report: &RunReport<'_>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serialize run report")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
    tracing::info!("wrote run report to {}", path.display());
    Ok(())
}

/// Plain-text summary box printed at the end of a run.
pub fn render_summary(summary: &RunSummary, output_dir: &Path) -> String {
    let rule = "─".repeat(BOX_WIDTH);
    let rows = [
        ("Total Trailers", summary.total.to_string()),
        ("Successfully Downloaded", summary.succeeded.to_string()),
        ("Failed", summary.failed.to_string()),
        ("Success Rate", format!("{:.1}%", summary.success_rate())),
        ("Output Folder", output_dir.display().to_string()),
    ];

    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "│ {:^56} │", "DOWNLOAD SUMMARY");
    let _ = writeln!(out, "{}", rule);
    for (key, value) in rows {
        let _ = writeln!(out, "│ {:<30}{:>26} │", key, value);
    }
    let _ = writeln!(out, "{}", rule);
    out
}
