//! Batch driver.
//!
//! Walks the work list strictly in order, one item at a time, running each
//! item through the retry state machine and recording exactly one result per
//! item in a [`RunLog`]. An item's failure never stops the batch.

mod report;

use anyhow::{Context, Result};
use std::collections::hash_map::{Entry, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::TdlConfig;
use crate::fetch::Fetcher;
use crate::item::{ItemResult, RunSummary, WorkItem};
use crate::retry::{run_item, PoliteDelay, RetryPolicy, Sleeper};
use crate::url_model::output_stem;

pub use report::{render_summary, write_json_report, RunReport};

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub policy: RetryPolicy,
    /// Per-attempt deadline.
    pub deadline: Duration,
    /// Pause after a successful item.
    pub polite_delay: PoliteDelay,
}

impl BatchOptions {
    pub fn from_config(cfg: &TdlConfig) -> Self {
        Self {
            output_dir: cfg.output_dir.clone(),
            policy: cfg.retry_policy(),
            deadline: cfg.attempt_timeout(),
            polite_delay: cfg.polite_delay(),
        }
    }
}

/// Accumulates item results in input order. Only the driver appends.
#[derive(Debug, Default)]
pub struct RunLog {
    results: Vec<ItemResult>,
    collisions: Vec<String>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, result: ItemResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[ItemResult] {
        &self.results
    }

    /// Labels whose output file name was already taken by an earlier item.
    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.results)
    }

    pub fn into_results(self) -> Vec<ItemResult> {
        self.results
    }
}

/// Runs every item and returns the filled log.
///
/// `on_item` is called after each item with its 0-based index and result.
/// Only setup failures (e.g. the output folder cannot be created) are errors.
pub fn run_batch<F, S, C>(
    items: &[WorkItem],
    opts: &BatchOptions,
    fetcher: &mut F,
    sleeper: &mut S,
    mut on_item: C,
) -> Result<RunLog>
where
    F: Fetcher + ?Sized,
    S: Sleeper + ?Sized,
    C: FnMut(usize, &ItemResult),
{
    if !opts.output_dir.exists() {
        std::fs::create_dir_all(&opts.output_dir).with_context(|| {
            format!("create output folder {}", opts.output_dir.display())
        })?;
        tracing::info!("created output folder {}", opts.output_dir.display());
    }
    tracing::info!(
        "starting batch: {} item(s), max {} attempt(s) each, output {}",
        items.len(),
        opts.policy.max_attempts(),
        opts.output_dir.display()
    );

    let mut log = RunLog::new();
    let mut rng = rand::thread_rng();
    // stem -> label of the first item that used it
    let mut stems: HashMap<PathBuf, String> = HashMap::new();

    for (index, item) in items.iter().enumerate() {
        let result = match item.url() {
            None => {
                tracing::warn!(label = %item.label, "skipping: no URL");
                ItemResult::skipped(item.label.clone())
            }
            Some(url) => {
                let stem = output_stem(&opts.output_dir, &item.label);
                match stems.entry(stem.clone()) {
                    Entry::Occupied(first) => {
                        tracing::warn!(
                            label = %item.label,
                            "output {} already used by {:?}; files may be overwritten",
                            stem.display(),
                            first.get()
                        );
                        log.collisions.push(item.label.clone());
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(item.label.clone());
                    }
                }
                run_item(
                    item,
                    url,
                    stem,
                    opts.deadline,
                    &opts.policy,
                    fetcher,
                    sleeper,
                )
            }
        };

        match result.last_error.as_deref() {
            Some(err) if !result.succeeded() => tracing::warn!(
                label = %result.label,
                attempts = result.attempts_made,
                "{}: {}",
                result.disposition,
                err
            ),
            _ => tracing::info!(
                label = %result.label,
                attempts = result.attempts_made,
                "{}",
                result.disposition
            ),
        }

        let succeeded = result.succeeded();
        on_item(index, &result);
        log.record(result);

        let more = index + 1 < items.len();
        if succeeded && more && !opts.polite_delay.is_disabled() {
            let pause = opts.polite_delay.sample(&mut rng);
            tracing::debug!("pausing {:.2}s before next item", pause.as_secs_f64());
            sleeper.sleep(pause);
        }
    }

    let summary = log.summary();
    tracing::info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "batch finished"
    );
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchOptions, FetchProfile};
    use crate::item::{Disposition, ItemStatus};
    use crate::retry::FetchError;
    use std::collections::HashMap;

    /// Fetcher keyed by URL; each URL has its own scripted results.
    #[derive(Default)]
    struct ByUrl {
        scripts: HashMap<String, Vec<Result<(), FetchError>>>,
        calls: Vec<(String, FetchProfile)>,
    }

    impl ByUrl {
        fn with(mut self, url: &str, script: Vec<Result<(), FetchError>>) -> Self {
            self.scripts.insert(url.to_string(), script);
            self
        }
    }

    impl Fetcher for ByUrl {
        fn fetch(&mut self, url: &str, opts: &FetchOptions) -> Result<(), FetchError> {
            self.calls.push((url.to_string(), opts.profile));
            let script = self.scripts.entry(url.to_string()).or_default();
            if script.is_empty() {
                Err(FetchError::Http(503))
            } else {
                script.remove(0)
            }
        }
    }

    #[derive(Default)]
    struct Recorded(Vec<Duration>);

    impl Sleeper for Recorded {
        fn sleep(&mut self, d: Duration) {
            self.0.push(d);
        }
    }

    fn opts(dir: &std::path::Path, polite: PoliteDelay) -> BatchOptions {
        BatchOptions {
            output_dir: dir.join("trailers"),
            policy: RetryPolicy {
                max_retries: 2,
                base_delay: Duration::from_millis(100),
                max_delay: None,
            },
            deadline: Duration::from_secs(5),
            polite_delay: polite,
        }
    }

    #[test]
    fn one_result_per_item_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let items = vec![
            WorkItem::new("Ok", "u1"),
            WorkItem::new("Missing", ""),
            WorkItem::new("Flaky", "u2"),
            WorkItem::new("Gone", "u3"),
            WorkItem::new("Locked", "u4"),
        ];
        let mut fetcher = ByUrl::default()
            .with("u1", vec![Ok(())])
            .with("u2", vec![Err(FetchError::Http(500)), Ok(())])
            .with("u3", vec![Err(FetchError::Http(404))])
            .with("u4", vec![Err(FetchError::Http(403)), Ok(())]);
        let mut sleeper = Recorded::default();
        let mut seen = Vec::new();

        let log = run_batch(
            &items,
            &opts(dir.path(), PoliteDelay::disabled()),
            &mut fetcher,
            &mut sleeper,
            |i, r| seen.push((i, r.disposition)),
        )
        .unwrap();

        let results = log.results();
        assert_eq!(results.len(), items.len());
        let labels: Vec<_> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Ok", "Missing", "Flaky", "Gone", "Locked"]);

        assert_eq!(results[0].disposition, Disposition::Downloaded);
        assert_eq!(results[1].disposition, Disposition::SkippedNoUrl);
        assert_eq!(results[1].attempts_made, 0);
        assert_eq!(results[1].final_status, ItemStatus::Failed);
        assert_eq!(results[2].attempts_made, 2);
        assert_eq!(results[3].disposition, Disposition::TerminalUnavailable);
        assert_eq!(results[4].disposition, Disposition::DownloadedDegraded);
        assert_eq!(results[4].attempts_made, 2);

        let summary = log.summary();
        assert_eq!(summary.total, 5);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 2);

        assert_eq!(seen.len(), 5);
        assert_eq!(seen[1], (1, Disposition::SkippedNoUrl));
        assert!(!fetcher.calls.iter().any(|(u, _)| u.is_empty()));
        assert!(dir.path().join("trailers").is_dir());
        // Only the backoff for Flaky; politeness is disabled.
        assert_eq!(sleeper.0, vec![Duration::from_millis(100)]);
    }

    #[test]
    fn exhausted_item_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let items = vec![WorkItem::new("Down", "bad"), WorkItem::new("Up", "good")];
        let mut fetcher = ByUrl::default().with("good", vec![Ok(())]);
        let mut sleeper = Recorded::default();
        let log = run_batch(
            &items,
            &opts(dir.path(), PoliteDelay::disabled()),
            &mut fetcher,
            &mut sleeper,
            |_, _| {},
        )
        .unwrap();
        let results = log.into_results();
        assert_eq!(results[0].disposition, Disposition::RetriedThenFailed);
        assert_eq!(results[0].attempts_made, 3);
        assert!(results[1].succeeded());
        assert_eq!(
            sleeper.0,
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[test]
    fn polite_pause_only_between_successes() {
        let dir = tempfile::tempdir().unwrap();
        let items = vec![
            WorkItem::new("A", "a"),
            WorkItem::new("Skip", " "),
            WorkItem::new("B", "b"),
        ];
        let mut fetcher = ByUrl::default()
            .with("a", vec![Ok(())])
            .with("b", vec![Ok(())]);
        let mut sleeper = Recorded::default();
        let polite = PoliteDelay::from_secs_f64(0.5, 0.5);
        run_batch(&items, &opts(dir.path(), polite), &mut fetcher, &mut sleeper, |_, _| {})
            .unwrap();
        // After A (more items follow); not after the skip; not after the last item.
        assert_eq!(sleeper.0, vec![Duration::from_millis(500)]);
    }

    #[test]
    fn output_stems_come_from_labels() {
        struct Stems(Vec<PathBuf>);
        impl Fetcher for Stems {
            fn fetch(&mut self, _url: &str, opts: &FetchOptions) -> Result<(), FetchError> {
                self.0.push(opts.output_stem.clone());
                Ok(())
            }
        }
        let dir = tempfile::tempdir().unwrap();
        let o = opts(dir.path(), PoliteDelay::disabled());
        let items = vec![WorkItem::new("Inside Out 2", "x")];
        let mut f = Stems(Vec::new());
        run_batch(&items, &o, &mut f, &mut Recorded::default(), |_, _| {}).unwrap();
        assert_eq!(f.0, vec![o.output_dir.join("Inside_Out_2")]);
    }

    #[test]
    fn colliding_output_names_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let items = vec![
            WorkItem::new("Alien: Romulus", "a"),
            WorkItem::new("Alien:  Romulus", "b"),
            WorkItem::new("No Link", ""),
            WorkItem::new("No  Link", ""),
            WorkItem::new("Smile 2", "c"),
        ];
        let mut fetcher = ByUrl::default()
            .with("a", vec![Ok(())])
            .with("b", vec![Ok(())])
            .with("c", vec![Ok(())]);
        let log = run_batch(
            &items,
            &opts(dir.path(), PoliteDelay::disabled()),
            &mut fetcher,
            &mut Recorded::default(),
            |_, _| {},
        )
        .unwrap();
        // Skipped items never write a file, so they cannot collide.
        assert_eq!(log.collisions().to_vec(), vec!["Alien:  Romulus".to_string()]);
        assert_eq!(log.summary().succeeded, 3);
    }

    #[test]
    fn empty_list_yields_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let log = run_batch(
            &[],
            &opts(dir.path(), PoliteDelay::disabled()),
            &mut ByUrl::default(),
            &mut Recorded::default(),
            |_, _| {},
        )
        .unwrap();
        assert_eq!(log.summary(), RunSummary::default());
    }
}
