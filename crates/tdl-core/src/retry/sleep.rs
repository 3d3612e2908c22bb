//! Blocking pauses: backoff between attempts and politeness jitter between items.

use rand::Rng;
use std::time::Duration;

/// Anything that can block the current thread for a duration.
pub trait Sleeper {
    fn sleep(&mut self, d: Duration);
}

/// Real sleeper backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}

/// Seconds to `Duration` without panicking: negative and NaN become zero,
/// values past `Duration::MAX` saturate.
pub(crate) fn duration_from_secs_f64(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Randomized pause window, drawn uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoliteDelay {
    pub min: Duration,
    pub max: Duration,
}

impl PoliteDelay {
    pub fn disabled() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    /// Builds a window from seconds; a reversed or negative range is normalized.
    pub fn from_secs_f64(min: f64, max: f64) -> Self {
        let lo = duration_from_secs_f64(min);
        let hi = duration_from_secs_f64(max).max(lo);
        Self { min: lo, max: hi }
    }

    pub fn is_disabled(&self) -> bool {
        self.max.is_zero()
    }

    /// Picks the next pause length.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}
