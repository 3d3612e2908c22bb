//! Per-item retry state machine.
//!
//! `Attempting(n)` either finishes (`Done`), backs off and retries with the
//! primary profile, or (once, on access denied) jumps straight to a degraded
//! attempt. Every attempt counts against `max_retries + 1`.

use std::path::PathBuf;
use std::time::Duration;

use super::classify::classify;
use super::policy::{AttemptOutcome, ErrorKind, RetryPolicy};
use super::sleep::Sleeper;
use crate::fetch::{FetchOptions, FetchProfile, Fetcher};
use crate::item::{Disposition, ItemResult, WorkItem};

/// Next step after an attempt, given its 1-based number, profile and result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Sequence is over.
    Done(Disposition),
    /// Sleep `delay`, then make attempt `next_attempt` with the primary profile.
    Retry { next_attempt: u32, delay: Duration },
    /// Make attempt `next_attempt` immediately with the degraded profile.
    Fallback { next_attempt: u32 },
}

/// Pure transition function of the machine.
pub fn transition(
    policy: &RetryPolicy,
    attempt: u32,
    profile: FetchProfile,
    result: Result<(), ErrorKind>,
) -> Transition {
    let budget_left = attempt < policy.max_attempts();
    let kind = match result {
        Ok(()) => {
            return Transition::Done(match profile {
                FetchProfile::Primary => Disposition::Downloaded,
                FetchProfile::Degraded => Disposition::DownloadedDegraded,
            })
        }
        Err(kind) => kind,
    };

    if profile == FetchProfile::Degraded {
        // The fallback is a single shot; whatever went wrong is final.
        return Transition::Done(match kind {
            ErrorKind::Unavailable => Disposition::TerminalUnavailable,
            _ => Disposition::TerminalRestricted,
        });
    }

    match kind {
        ErrorKind::AccessRestricted if budget_left => Transition::Fallback {
            next_attempt: attempt + 1,
        },
        ErrorKind::AccessRestricted => Transition::Done(Disposition::TerminalRestricted),
        ErrorKind::Unavailable => Transition::Done(Disposition::TerminalUnavailable),
        _ if budget_left => Transition::Retry {
            next_attempt: attempt + 1,
            delay: policy.backoff_delay(attempt),
        },
        _ => Transition::Done(Disposition::RetriedThenFailed),
    }
}

/// Runs one item's attempts through `fetcher` until the machine is done.
///
/// The item must have a URL; the batch driver records URL-less items itself.
pub fn run_item<F, S>(
    item: &WorkItem,
    url: &str,
    output_stem: PathBuf,
    deadline: Duration,
    policy: &RetryPolicy,
    fetcher: &mut F,
    sleeper: &mut S,
) -> ItemResult
where
    F: Fetcher + ?Sized,
    S: Sleeper + ?Sized,
{
    let mut opts = FetchOptions {
        profile: FetchProfile::Primary,
        deadline,
        output_stem,
    };
    let mut attempt = 1u32;
    let mut history = Vec::new();
    let mut last_error = None;

    loop {
        tracing::debug!(label = %item.label, attempt, profile = ?opts.profile, "fetch attempt");
        let result = match fetcher.fetch(url, &opts) {
            Ok(()) => {
                history.push(AttemptOutcome::Success);
                Ok(())
            }
            Err(e) => {
                let kind = classify(&e);
                let reason = e.to_string();
                tracing::warn!(label = %item.label, attempt, ?kind, "attempt failed: {}", reason);
                history.push(AttemptOutcome::from_failure(kind, reason.clone()));
                last_error = Some(reason);
                Err(kind)
            }
        };

        match transition(policy, attempt, opts.profile, result) {
            Transition::Done(disposition) => {
                return ItemResult {
                    label: item.label.clone(),
                    final_status: disposition.status(),
                    attempts_made: attempt,
                    disposition,
                    last_error,
                    history,
                };
            }
            Transition::Retry {
                next_attempt,
                delay,
            } => {
                tracing::info!(
                    label = %item.label,
                    "retrying in {:.1}s (attempt {}/{})",
                    delay.as_secs_f64(),
                    next_attempt,
                    policy.max_attempts()
                );
                sleeper.sleep(delay);
                attempt = next_attempt;
                opts.profile = FetchProfile::Primary;
            }
            Transition::Fallback { next_attempt } => {
                tracing::info!(label = %item.label, "access restricted, trying degraded profile");
                attempt = next_attempt;
                opts.profile = FetchProfile::Degraded;
            }
        }
    }
}
