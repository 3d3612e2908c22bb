//! Trailer collector: builds the work list from channel listings.
//!
//! Keeps uploads whose title says "official trailer", names each by the text
//! before the first `|`, and keeps the first upload seen per movie across all
//! channels of a run.

mod listing;

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::input::Columns;

pub use listing::{parse_listing, videos_tab_url, ChannelLister, ListingEntry, YtDlpLister};

const WATCH_BASE: &str = "https://www.youtube.com/watch";

/// A trailer picked from a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedTrailer {
    pub movie: String,
    pub title: String,
    pub video_id: String,
}

impl CollectedTrailer {
    pub fn watch_url(&self) -> String {
        watch_url(&self.video_id)
    }
}

/// `https://www.youtube.com/watch?v=<id>`, with the id query-encoded.
pub fn watch_url(video_id: &str) -> String {
    match url::Url::parse_with_params(WATCH_BASE, &[("v", video_id)]) {
        Ok(u) => u.into(),
        Err(_) => format!("{}?v={}", WATCH_BASE, video_id),
    }
}

/// True when the title marks an official trailer.
pub fn is_official_trailer(title: &str) -> bool {
    title.to_lowercase().contains("official trailer")
}

/// Movie name: the title up to the first `|`, trimmed.
pub fn movie_name(title: &str) -> &str {
    title.split('|').next().unwrap_or(title).trim()
}

/// De-duplicating trailer picker shared across channels.
#[derive(Debug, Default)]
pub struct Collector {
    seen: HashSet<String>,
    trailers: Vec<CollectedTrailer>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up to `limit` new trailers from one listing; returns how many were added.
    pub fn add_listing(&mut self, entries: &[ListingEntry], limit: usize) -> usize {
        let mut added = 0;
        for entry in entries {
            if added >= limit {
                break;
            }
            if !is_official_trailer(&entry.title) {
                continue;
            }
            let movie = movie_name(&entry.title);
            if !self.seen.insert(movie.to_string()) {
                continue;
            }
            self.trailers.push(CollectedTrailer {
                movie: movie.to_string(),
                title: entry.title.clone(),
                video_id: entry.video_id.clone(),
            });
            added += 1;
        }
        added
    }

    pub fn trailers(&self) -> &[CollectedTrailer] {
        &self.trailers
    }

    pub fn into_trailers(self) -> Vec<CollectedTrailer> {
        self.trailers
    }
}

/// Lists every channel in order and collects trailers.
///
/// A channel that cannot be listed is logged and skipped.
pub fn collect_channels<L: ChannelLister + ?Sized>(
    lister: &mut L,
    channels: &[String],
    limit_per_channel: usize,
) -> Vec<CollectedTrailer> {
    let mut collector = Collector::new();
    for (i, channel) in channels.iter().enumerate() {
        match lister.list(channel) {
            Ok(entries) => {
                let added = collector.add_listing(&entries, limit_per_channel);
                tracing::info!(
                    channel = %channel,
                    "channel {}/{}: {} video(s), {} new trailer(s), {} total",
                    i + 1,
                    channels.len(),
                    entries.len(),
                    added,
                    collector.trailers().len()
                );
            }
            Err(e) => {
                tracing::error!(channel = %channel, "could not list channel: {:#}", e);
            }
        }
    }
    collector.into_trailers()
}

/// Writes trailers as a work-list CSV using the given column headers.
pub fn write_work_list(path: &Path, trailers: &[CollectedTrailer], columns: &Columns) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.write_record([columns.label.as_str(), columns.url.as_str()])?;
    for t in trailers {
        wtr.write_record([t.movie.as_str(), t.watch_url().as_str()])?;
    }
    wtr.flush().with_context(|| format!("write {}", path.display()))?;
    tracing::info!("saved {} trailer(s) to {}", trailers.len(), path.display());
    Ok(())
}
