//! Injectable source of the current UTC time.

use jiff::Timestamp;

/// Source of "now" used by expiry checks.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current UTC instant.
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;
