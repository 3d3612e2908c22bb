//! `tdl collect` – build a work list from channel listings.

use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tdl_core::collect::{self, YtDlpLister};
use tdl_core::config::TdlConfig;

/// Listing a large channel can take a while; allow well beyond one download.
const LISTING_TIMEOUT: Duration = Duration::from_secs(900);

pub fn run_collect(cfg: &TdlConfig, channels: &[String], limit: usize, out: &Path) -> Result<()> {
    println!("Fetching trailers from {} channel(s)", channels.len());
    let mut lister = YtDlpLister::new(cfg.ytdlp_path.clone(), LISTING_TIMEOUT);
    let trailers = collect::collect_channels(&mut lister, channels, limit);

    if trailers.is_empty() {
        println!("No official trailers found.");
        return Ok(());
    }

    collect::write_work_list(out, &trailers, &cfg.columns())?;
    for (i, t) in trailers.iter().enumerate() {
        println!("{}. {}", i + 1, t.movie);
        println!("   {}", t.watch_url());
    }
    println!(
        "Saved {} unique trailer(s) to {}",
        trailers.len(),
        out.display()
    );
    Ok(())
}
