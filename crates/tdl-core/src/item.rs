//! Work items and their results.

use serde::Serialize;
use std::fmt;

use crate::retry::AttemptOutcome;

/// One unit of work: a label (movie title) and the URL to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub label: String,
    pub source_url: String,
}

impl WorkItem {
    pub fn new(label: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source_url: source_url.into(),
        }
    }

    /// URL with surrounding whitespace removed; `None` when nothing is left.
    pub fn url(&self) -> Option<&str> {
        let u = self.source_url.trim();
        (!u.is_empty()).then_some(u)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Succeeded,
    Failed,
}

/// Why an item ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    /// Fetched with the primary profile.
    Downloaded,
    /// Fetched by the fallback attempt after access was denied.
    DownloadedDegraded,
    /// No URL in the input; never attempted.
    SkippedNoUrl,
    /// Transient failures used up the retry budget.
    RetriedThenFailed,
    /// Access denied, fallback did not help (or could not run).
    TerminalRestricted,
    /// Resource gone; retrying is futile.
    TerminalUnavailable,
}

impl Disposition {
    pub fn status(self) -> ItemStatus {
        match self {
            Disposition::Downloaded | Disposition::DownloadedDegraded => ItemStatus::Succeeded,
            _ => ItemStatus::Failed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Downloaded => "downloaded",
            Disposition::DownloadedDegraded => "downloaded-degraded",
            Disposition::SkippedNoUrl => "skipped-no-url",
            Disposition::RetriedThenFailed => "retried-then-failed",
            Disposition::TerminalRestricted => "terminal-restricted",
            Disposition::TerminalUnavailable => "terminal-unavailable",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final record for one work item. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub label: String,
    pub final_status: ItemStatus,
    pub attempts_made: u32,
    pub disposition: Disposition,
    /// Reason of the last failed attempt, if any.
    pub last_error: Option<String>,
    /// Outcome of every attempt, in order.
    pub history: Vec<AttemptOutcome>,
}

impl ItemResult {
    pub fn skipped(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            final_status: ItemStatus::Failed,
            attempts_made: 0,
            disposition: Disposition::SkippedNoUrl,
            last_error: None,
            history: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.final_status == ItemStatus::Succeeded
    }
}

/// Aggregate counts over a run. Derived from results, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_results(results: &[ItemResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.succeeded()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    /// Percentage of items that succeeded (0 for an empty run).
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(d: Disposition) -> ItemResult {
        ItemResult {
            label: "x".into(),
            final_status: d.status(),
            attempts_made: 1,
            disposition: d,
            last_error: None,
            history: Vec::new(),
        }
    }

    #[test]
    fn blank_url_is_none() {
        assert_eq!(WorkItem::new("a", "  ").url(), None);
        assert_eq!(WorkItem::new("a", " https://x ").url(), Some("https://x"));
    }

    #[test]
    fn summary_counts_and_rate() {
        let results = vec![
            result(Disposition::Downloaded),
            result(Disposition::DownloadedDegraded),
            result(Disposition::TerminalRestricted),
            ItemResult::skipped("y"),
        ];
        let s = RunSummary::from_results(&results);
        assert_eq!(s.total, 4);
        assert_eq!(s.succeeded, 2);
        assert_eq!(s.failed, 2);
        assert!((s.success_rate() - 50.0).abs() < 1e-9);
        assert_eq!(RunSummary::default().success_rate(), 0.0);
    }

    #[test]
    fn disposition_labels() {
        assert_eq!(Disposition::SkippedNoUrl.to_string(), "skipped-no-url");
        assert_eq!(
            serde_json::to_string(&Disposition::RetriedThenFailed).unwrap(),
            "\"retried-then-failed\""
        );
    }
}
