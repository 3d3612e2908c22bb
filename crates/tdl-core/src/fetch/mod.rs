//! Fetch backends.
//!
//! The retry machinery never downloads anything itself; it drives a
//! [`Fetcher`] once per attempt. Two backends ship: the `yt-dlp` executable
//! for video pages and libcurl for direct file URLs.

mod http;
mod timed;
mod ytdlp;

use crate::config::{FetchBackend, TdlConfig};
use crate::retry::FetchError;
use std::path::PathBuf;
use std::time::Duration;

pub use http::CurlFetcher;
pub use timed::{run_with_deadline, TimedOutcome};
pub use ytdlp::YtDlpFetcher;

/// Which configuration an attempt uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchProfile {
    /// Best quality, default client identity.
    Primary,
    /// Lower quality and alternate client identity; used once after access is denied.
    Degraded,
}

/// Per-attempt options handed to a fetcher.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub profile: FetchProfile,
    /// Wall-clock bound for this attempt.
    pub deadline: Duration,
    /// Output path without extension; the backend picks the extension.
    pub output_stem: PathBuf,
}

/// Fetches one URL to disk. Implementations must not retry internally.
pub trait Fetcher {
    fn fetch(&mut self, url: &str, opts: &FetchOptions) -> Result<(), FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&mut self, url: &str, opts: &FetchOptions) -> Result<(), FetchError> {
        (**self).fetch(url, opts)
    }
}

/// Builds the backend selected in config.
pub fn fetcher_from_config(cfg: &TdlConfig) -> Box<dyn Fetcher> {
    match cfg.fetch_backend {
        FetchBackend::Ytdlp => Box::new(YtDlpFetcher::from_config(cfg)),
        FetchBackend::Curl => Box::new(CurlFetcher::from_config(cfg)),
    }
}
