//! Hysteresis timer
//!
//! Remembers the last time charging activity was reset. A connected car that
//! draws no power is only considered done once this timer has run out, which
//! keeps the verdict from flapping when power dips for a moment.

use crate::error::{ChargeGuardError, Result};
use chrono::{DateTime, TimeDelta, Utc};

/// Default time without activity before a connected car counts as done
pub const DEFAULT_DONE_TIMEOUT_SECONDS: u64 = 180;

#[derive(Debug, Clone)]
pub struct HysteresisTimer {
    last_reset: DateTime<Utc>,
    timeout: TimeDelta,
    timeout_seconds: u64,
}

impl HysteresisTimer {
    /// Create a timer whose last reset is `now`
    pub fn new(timeout_seconds: u64, now: DateTime<Utc>) -> Result<Self> {
        if timeout_seconds == 0 {
            return Err(ChargeGuardError::validation(
                "done_timeout_seconds",
                "Must be greater than 0",
            ));
        }
        let timeout = i64::try_from(timeout_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| {
                ChargeGuardError::validation("done_timeout_seconds", "Timeout is out of range")
            })?;
        Ok(Self {
            last_reset: now,
            timeout,
            timeout_seconds,
        })
    }

    pub fn reset_activity(&mut self, now: DateTime<Utc>) {
        self.last_reset = now;
    }

    /// True once strictly more than the timeout has passed since the last reset
    pub fn is_timed_out(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_reset) > self.timeout
    }

    pub fn last_reset(&self) -> DateTime<Utc> {
        self.last_reset
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}
