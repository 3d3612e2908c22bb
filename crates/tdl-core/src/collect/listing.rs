//! Channel video listings via `yt-dlp --flat-playlist -J`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::process::Command;
use std::time::Duration;

use crate::fetch::{run_with_deadline, TimedOutcome};

/// One video entry of a channel listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub video_id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct RawPlaylist {
    #[serde(default)]
    entries: Vec<Option<RawEntry>>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: Option<String>,
    title: Option<String>,
}

/// Source of channel listings. Split out so the collector can be driven
/// without a network.
pub trait ChannelLister {
    fn list(&mut self, channel_url: &str) -> Result<Vec<ListingEntry>>;
}

/// Ensures the URL points at the channel's videos tab.
pub fn videos_tab_url(channel_url: &str) -> String {
    let trimmed = channel_url.trim().trim_end_matches('/');
    if trimmed.ends_with("/videos") {
        trimmed.to_string()
    } else {
        format!("{}/videos", trimmed)
    }
}

/// Parses a flat-playlist JSON document. Null or id-less entries are skipped.
pub fn parse_listing(json: &[u8]) -> Result<Vec<ListingEntry>> {
    let raw: RawPlaylist = serde_json::from_slice(json).context("parse playlist JSON")?;
    Ok(raw
        .entries
        .into_iter()
        .flatten()
        .filter_map(|e| {
            let id = e.id.filter(|s| !s.is_empty())?;
            Some(ListingEntry {
                video_id: id,
                title: e.title.unwrap_or_default(),
            })
        })
        .collect())
}

/// Lists channels by running yt-dlp in flat-playlist mode.
#[derive(Debug, Clone)]
pub struct YtDlpLister {
    program: String,
    deadline: Duration,
}

impl YtDlpLister {
    pub fn new(program: impl Into<String>, deadline: Duration) -> Self {
        Self {
            program: program.into(),
            deadline,
        }
    }
}

impl ChannelLister for YtDlpLister {
    fn list(&mut self, channel_url: &str) -> Result<Vec<ListingEntry>> {
        let url = videos_tab_url(channel_url);
        tracing::info!("fetching videos from {}", url);
        let mut cmd = Command::new(&self.program);
        cmd.args(["--flat-playlist", "-J", "--quiet", "--no-warnings", "--ignore-errors", "--"])
            .arg(&url);
        match run_with_deadline(&mut cmd, self.deadline, true)
            .with_context(|| format!("run {}", self.program))?
        {
            TimedOutcome::Exited { status, stdout, .. } if status.success() => parse_listing(&stdout),
            TimedOutcome::Exited { status, stderr, .. } => {
                bail!("listing {} failed ({}): {}", url, status, stderr)
            }
            TimedOutcome::TimedOut { elapsed } => {
                bail!("listing {} timed out after {:.0}s", url, elapsed.as_secs_f64())
            }
        }
    }
}
