//! Work list input: a CSV with a header row naming the label and URL columns.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use crate::item::WorkItem;

/// Label used when a row has no value in the label column.
const UNKNOWN_LABEL: &str = "Unknown";

/// Which headers hold the label and the URL.
#[derive(Debug, Clone)]
pub struct Columns {
    pub label: String,
    pub url: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            label: "Movie Title".to_string(),
            url: "YouTube Link".to_string(),
        }
    }
}

/// Reads work items from a CSV file, preserving row order.
pub fn read_work_items(path: &Path, columns: &Columns) -> Result<Vec<WorkItem>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open work list {}", path.display()))?;
    read_work_items_from(file, columns).with_context(|| format!("read {}", path.display()))
}

/// Reads work items from any CSV source.
///
/// Rows shorter than the header are tolerated: a missing URL cell yields an
/// item with an empty URL (skipped later), a missing label becomes "Unknown".
pub fn read_work_items_from<R: Read>(reader: R, columns: &Columns) -> Result<Vec<WorkItem>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().context("read CSV header row")?.clone();
    let label_idx = column_index(&headers, &columns.label)?;
    let url_idx = column_index(&headers, &columns.url)?;

    let mut items = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        // Row numbers are 1-based and count the header.
        let record = record.with_context(|| format!("parse CSV row {}", row + 2))?;
        let label = record
            .get(label_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_LABEL);
        let url = record.get(url_idx).map(str::trim).unwrap_or_default();
        items.push(WorkItem::new(label, url));
    }
    tracing::debug!("read {} work item(s)", items.len());
    Ok(items)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == name)
        .with_context(|| format!("missing column {:?} in CSV header", name))
}
