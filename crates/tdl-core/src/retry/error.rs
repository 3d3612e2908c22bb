//! Fetch error type for retry classification.

use std::time::Duration;
use thiserror::Error;

/// Error returned by a single fetch attempt.
/// Kept typed so we can classify and decide retries before reporting.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The attempt ran past its deadline and was stopped.
    #[error("timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),
    /// Downloader process exited unsuccessfully; `stderr` holds its last words.
    #[error("downloader exited with {}: {stderr}", exit_label(.code))]
    Process { code: Option<i32>, stderr: String },
    /// Downloader process could not be started.
    #[error("could not start downloader: {0}")]
    Spawn(std::io::Error),
    /// Writing the output file failed.
    #[error("storage: {0}")]
    Storage(std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "signal".to_string(),
    }
}
