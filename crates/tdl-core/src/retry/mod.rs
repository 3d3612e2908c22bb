//! Retry and backoff policy.
//!
//! Error classification (timeouts, throttling, access denied, gone),
//! exponential backoff, the per-item state machine, and the blocking pauses
//! it relies on.

mod classify;
mod error;
mod machine;
mod policy;
mod sleep;

pub use classify::{classify, classify_curl_error, classify_downloader_message, classify_http_status};
pub use error::FetchError;
pub use machine::{run_item, transition, Transition};
pub use policy::{AttemptOutcome, ErrorKind, RetryPolicy};
pub use sleep::{PoliteDelay, Sleeper, ThreadSleeper};
pub(crate) use sleep::duration_from_secs_f64;
