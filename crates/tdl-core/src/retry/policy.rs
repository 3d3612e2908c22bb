use serde::Serialize;
use std::time::Duration;

/// High-level classification of a failed fetch for retry purposes.
///
/// Backends map HTTP status codes, curl errors, or downloader messages into
/// these kinds; the state machine only ever looks at the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Attempt exceeded its wall-clock deadline.
    Timeout,
    /// Remote asked us to slow down (429).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// 5xx from the remote.
    Server(u16),
    /// Access denied (401/403, sign-in or age gate).
    AccessRestricted,
    /// Resource is gone (404/410, removed or private video).
    Unavailable,
    /// Anything we could not classify.
    Other,
}

impl ErrorKind {
    /// Retrying is known to be futile for these kinds (after any fallback).
    pub fn is_terminal(self) -> bool {
        matches!(self, ErrorKind::AccessRestricted | ErrorKind::Unavailable)
    }
}

/// Result of one fetch attempt, as recorded in the item history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    TransientFailure(String),
    TerminalFailure(String),
}

impl AttemptOutcome {
    /// Maps a classified failure to an outcome. Unclassified errors count as
    /// transient so they share the retry ceiling.
    pub fn from_failure(kind: ErrorKind, reason: impl Into<String>) -> Self {
        if kind.is_terminal() {
            AttemptOutcome::TerminalFailure(reason.into())
        } else {
            AttemptOutcome::TransientFailure(reason.into())
        }
    }
}

/// Exponential backoff policy for one work item.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt; at most `max_retries + 1` attempts.
    pub max_retries: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Optional upper bound on backoff delay.
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: None,
        }
    }
}

impl RetryPolicy {
    /// Total attempts an item may consume, fallback included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff delay after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let raw = if self.base_delay.is_zero() {
            Duration::ZERO
        } else {
            2u128
                .checked_pow(attempt.saturating_sub(1))
                .and_then(|factor| self.base_delay.as_nanos().checked_mul(factor))
                .map_or(Duration::MAX, duration_from_nanos)
        };
        match self.max_delay {
            Some(cap) => raw.min(cap),
            None => raw,
        }
    }
}

/// Saturates at `Duration::MAX` instead of wrapping.
fn duration_from_nanos(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}
