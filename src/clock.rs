//! Injected time sources
//!
//! The resolver never reads the wall clock directly. It asks a [`Clock`] for
//! the current instant (hysteresis timer) and the current hour of day
//! (non-charging hours), so tests and replays can freeze or advance time.

use crate::error::{ChargeGuardError, Result};
use chrono::{DateTime, TimeDelta, Timelike, Utc};
use chrono_tz::Tz;
use std::sync::{Arc, Mutex, PoisonError};

/// Source of "now" for the decision engine
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Current hour of day (0..=23) in the clock's local timezone
    fn current_hour(&self) -> u8;
}

/// Wall-clock time, hours reported in a configured timezone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build from an IANA timezone name such as `Europe/Amsterdam`
    pub fn from_timezone(name: &str) -> Result<Self> {
        let tz: Tz = name.parse().map_err(|_| {
            let message = format!("Unknown timezone: {}", name);
            ChargeGuardError::validation("timezone", message.as_str())
        })?;
        Ok(Self::new(tz))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn current_hour(&self) -> u8 {
        self.now().with_timezone(&self.tz).hour() as u8
    }
}

/// Manually driven clock; clones share the same instant
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    /// Move time forward (or backward for a negative delta)
    pub fn advance(&self, delta: TimeDelta) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) += delta;
    }

    pub fn advance_secs(&self, seconds: i64) {
        self.advance(TimeDelta::seconds(seconds));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_hour(&self) -> u8 {
        self.now().hour() as u8
    }
}
