//! `tdl download` – fetch every item of a CSV work list.

use anyhow::Result;
use std::path::PathBuf;
use tdl_core::batch::{self, BatchOptions, RunReport};
use tdl_core::config::{FetchBackend, TdlConfig};
use tdl_core::fetch;
use tdl_core::input;
use tdl_core::retry::ThreadSleeper;

/// Command-line overrides for a download run.
#[derive(Debug, Clone, Default)]
pub struct DownloadArgs {
    pub csv: PathBuf,
    pub output: Option<PathBuf>,
    pub backend: Option<FetchBackend>,
    pub max_retries: Option<u32>,
    pub timeout: Option<u64>,
    pub report: Option<PathBuf>,
}

/// Applies command-line overrides on top of the loaded config.
pub(crate) fn apply_overrides(mut cfg: TdlConfig, args: &DownloadArgs) -> TdlConfig {
    if let Some(dir) = &args.output {
        cfg.output_dir = dir.clone();
    }
    if let Some(backend) = args.backend {
        cfg.fetch_backend = backend;
    }
    if let Some(n) = args.max_retries {
        let mut retry = cfg.retry.take().unwrap_or_default();
        retry.max_retries = n;
        cfg.retry = Some(retry);
    }
    if let Some(secs) = args.timeout {
        cfg.timeout_secs = secs;
    }
    cfg
}

pub fn run_download(cfg: TdlConfig, args: &DownloadArgs) -> Result<()> {
    let cfg = apply_overrides(cfg, args);
    let items = input::read_work_items(&args.csv, &cfg.columns())?;
    println!("Found {} trailer(s) in {}", items.len(), args.csv.display());

    let opts = BatchOptions::from_config(&cfg);
    let mut fetcher = fetch::fetcher_from_config(&cfg);
    let mut sleeper = ThreadSleeper;
    let total = items.len();
    let mut done = 0usize;

    let log = batch::run_batch(&items, &opts, &mut fetcher, &mut sleeper, |index, result| {
        if result.succeeded() {
            done += 1;
        }
        let failed = index + 1 - done;
        println!(
            "[{}/{}] {}: {} (attempts: {}, done: {}, failed: {})",
            index + 1,
            total,
            result.label,
            result.disposition,
            result.attempts_made,
            done,
            failed
        );
    })?;

    print!("{}", batch::render_summary(&log.summary(), &opts.output_dir));
    for label in log.collisions() {
        println!("Warning: {} shares its output file with an earlier item", label);
    }

    if let Some(path) = &args.report {
        batch::write_json_report(path, &RunReport::new(&opts.output_dir, log.results()))?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}
